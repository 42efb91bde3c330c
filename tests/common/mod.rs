//! Shared fixtures for integration tests.
//!
//! Every port is backed by one `InMemoryStore` and time by a `ManualClock`,
//! so tests can advance time and inspect every table.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};

use saas_core::adapters::auth::{Argon2CredentialVerifier, JwtTokenCodec};
use saas_core::adapters::http::{app_router, AppPorts, AppState};
use saas_core::adapters::memory::{InMemoryStore, ManualClock};
use saas_core::application::handlers::auth::{
    RegisterCommand, RegisterResult, SessionGuardConfig,
};
use saas_core::application::handlers::billing::WebhookIntakeConfig;
use saas_core::domain::billing::DEFAULT_TOLERANCE_SECS;
use saas_core::domain::foundation::{Timestamp, UserId};
use saas_core::ports::{Clock, UserRepository};

/// 2024-01-01T00:00:00Z
pub const T0: i64 = 1_704_067_200;
pub const SESSION_TTL_SECS: i64 = 3_600;
pub const PASSWORD: &str = "correct horse battery";
const SESSION_SECRET: &str = "integration-session-secret-0123456789";

pub struct Harness {
    pub store: InMemoryStore,
    pub clock: Arc<ManualClock>,
    pub state: AppState,
}

impl Harness {
    /// Development mode: webhooks are accepted unsigned.
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_webhook_secret(secret: &str) -> Self {
        Self::build(Some(secret))
    }

    fn build(webhook_secret: Option<&str>) -> Self {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::at_unix(T0));

        let ports = AppPorts {
            users: Arc::new(store.clone()),
            sessions: Arc::new(store.clone()),
            entitlements: Arc::new(store.clone()),
            alerts: Arc::new(store.clone()),
            integrations: Arc::new(store.clone()),
            webhook_events: Arc::new(store.clone()),
            credentials: Arc::new(Argon2CredentialVerifier::new()),
            codec: Arc::new(JwtTokenCodec::new(
                SecretString::new(SESSION_SECRET.to_string()),
                "saas-core-test",
            )),
            clock: clock.clone(),
        };
        let guard_config = SessionGuardConfig {
            session_ttl_secs: SESSION_TTL_SECS,
            token_issuer: "saas-core-test".to_string(),
        };
        let intake_config = WebhookIntakeConfig {
            webhook_secret: webhook_secret.map(|s| SecretString::new(s.to_string())),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        };

        Self {
            state: AppState::new(ports, guard_config, intake_config),
            store,
            clock,
        }
    }

    pub fn router(&self) -> Router {
        app_router(self.state.clone(), Duration::from_secs(10))
    }

    pub async fn register(&self, email: &str) -> RegisterResult {
        self.state
            .register
            .handle(RegisterCommand {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                display_name: "Test User".to_string(),
                company_name: None,
            })
            .await
            .expect("registration succeeds")
    }

    pub async fn bind_customer(&self, user_id: &UserId, customer_id: &str) {
        let bound = self
            .store
            .bind_billing_customer(user_id, customer_id, self.clock_now())
            .await
            .expect("bind succeeds");
        assert!(bound, "customer {} was already bound", customer_id);
    }

    pub fn clock_now(&self) -> Timestamp {
        self.clock.now()
    }
}

/// Serialized billing event envelope.
pub fn event(id: &str, event_type: &str, created: i64, object: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": id,
        "type": event_type,
        "created": created,
        "data": { "object": object }
    }))
    .expect("event serializes")
}

pub fn subscription_object(sub_id: &str, customer: &str, status: &str, plan: &str) -> Value {
    json!({
        "id": sub_id,
        "customer": customer,
        "status": status,
        "current_period_start": T0,
        "current_period_end": T0 + 30 * 86_400,
        "cancel_at_period_end": false,
        "metadata": { "plan": plan }
    })
}

pub fn subscription_event(
    event_id: &str,
    event_type: &str,
    created: i64,
    sub_id: &str,
    customer: &str,
    status: &str,
    plan: &str,
) -> Vec<u8> {
    event(
        event_id,
        event_type,
        created,
        subscription_object(sub_id, customer, status, plan),
    )
}
