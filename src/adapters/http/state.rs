//! Shared application state for the HTTP surface.

use std::sync::Arc;

use crate::application::handlers::alerts::{AlertEmitter, ListAlertsHandler};
use crate::application::handlers::auth::{
    LoginHandler, RegisterHandler, SessionGuard, SessionGuardConfig,
};
use crate::application::handlers::billing::{
    BillingEventReconciler, WebhookIntake, WebhookIntakeConfig,
};
use crate::application::handlers::entitlement::EntitlementQueries;
use crate::application::handlers::integration::IntegrationHandler;
use crate::domain::billing::IdempotentWebhookProcessor;
use crate::ports::{
    AlertSink, Clock, CredentialVerifier, EntitlementStore, IntegrationRepository, SessionStore,
    TokenCodec, UserRepository, WebhookEventRepository,
};

/// Port implementations the HTTP surface is built from.
///
/// Production wires the Postgres adapters; tests wire one `InMemoryStore`
/// into every slot.
#[derive(Clone)]
pub struct AppPorts {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub entitlements: Arc<dyn EntitlementStore>,
    pub alerts: Arc<dyn AlertSink>,
    pub integrations: Arc<dyn IntegrationRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub codec: Arc<dyn TokenCodec>,
    pub clock: Arc<dyn Clock>,
}

/// Shared application state containing all handlers.
///
/// Cloned per request; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<SessionGuard>,
    pub register: Arc<RegisterHandler>,
    pub login: Arc<LoginHandler>,
    pub entitlements: Arc<EntitlementQueries>,
    pub alerts: Arc<ListAlertsHandler>,
    pub integrations: Arc<IntegrationHandler>,
    pub webhooks: Arc<WebhookIntake>,
}

impl AppState {
    /// Wires handlers from ports and their configuration.
    pub fn new(
        ports: AppPorts,
        guard_config: SessionGuardConfig,
        intake_config: WebhookIntakeConfig,
    ) -> Self {
        let guard = Arc::new(SessionGuard::new(
            ports.sessions.clone(),
            ports.codec.clone(),
            ports.clock.clone(),
            guard_config,
        ));

        let emitter = Arc::new(AlertEmitter::new(ports.alerts.clone()));
        let reconciler = Arc::new(BillingEventReconciler::new(
            ports.users.clone(),
            ports.entitlements.clone(),
            emitter,
            ports.clock.clone(),
        ));
        let processor = Arc::new(IdempotentWebhookProcessor::new(
            ports.webhook_events.clone(),
            reconciler,
            ports.clock.clone(),
        ));

        Self {
            register: Arc::new(RegisterHandler::new(
                ports.users.clone(),
                ports.credentials.clone(),
                guard.clone(),
                ports.clock.clone(),
            )),
            login: Arc::new(LoginHandler::new(
                ports.users.clone(),
                ports.credentials.clone(),
                guard.clone(),
            )),
            entitlements: Arc::new(EntitlementQueries::new(
                ports.users.clone(),
                ports.entitlements.clone(),
            )),
            alerts: Arc::new(ListAlertsHandler::new(ports.alerts.clone())),
            integrations: Arc::new(IntegrationHandler::new(
                ports.integrations.clone(),
                ports.entitlements.clone(),
                ports.clock.clone(),
            )),
            webhooks: Arc::new(WebhookIntake::new(intake_config, processor, ports.clock)),
            guard,
        }
    }
}
