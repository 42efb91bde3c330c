//! In-memory implementation of every storage port.
//!
//! All tables live behind one `tokio::sync::RwLock`, so each multi-table
//! operation (subscription + user status, cancellation + integration
//! deactivation, user deletion cascade) is atomic. Used by integration
//! tests and local development without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::alert::Alert;
use crate::domain::foundation::{
    DomainError, ErrorCode, IntegrationId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::integration::Integration;
use crate::domain::session::Session;
use crate::domain::subscription::{ApplyResult, Subscription, SubscriptionChange};
use crate::domain::user::{AccountStatus, User};
use crate::ports::{
    AlertSink, ClaimResult, EntitlementStore, IntegrationRepository, SessionStore,
    SubscriptionTransition, UserRepository, WebhookEventRecord, WebhookEventRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    sessions: HashMap<String, Session>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    alerts: Vec<Alert>,
    integrations: HashMap<IntegrationId, Integration>,
    webhook_events: HashMap<String, WebhookEventRecord>,
}

impl Tables {
    fn subscription_id_by_billing_id(&self, billing_subscription_id: &str) -> Option<SubscriptionId> {
        self.subscriptions
            .values()
            .find(|s| s.billing_subscription_id.as_deref() == Some(billing_subscription_id))
            .map(|s| s.id)
    }

    fn set_account_status(&mut self, user_id: &UserId, status: AccountStatus, now: Timestamp) {
        if let Some(user) = self.users.get_mut(user_id) {
            user.subscription_status = status;
            user.updated_at = now;
        }
    }
}

/// Shared in-memory tables implementing all storage ports.
///
/// Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `DatabaseError` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DomainError::database("in-memory store marked unavailable"))
        } else {
            Ok(())
        }
    }

    // === Test Helpers ===

    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    pub async fn subscription_count_for_billing_id(&self, billing_subscription_id: &str) -> usize {
        self.tables
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| s.billing_subscription_id.as_deref() == Some(billing_subscription_id))
            .count()
    }

    pub async fn alert_count_for_user(&self, user_id: &UserId) -> usize {
        self.tables
            .read()
            .await
            .alerts
            .iter()
            .filter(|a| &a.user_id == user_id)
            .count()
    }

    pub async fn orphan_count(&self, user_id: &UserId) -> usize {
        let tables = self.tables.read().await;
        tables.sessions.values().filter(|s| &s.user_id == user_id).count()
            + tables.subscriptions.values().filter(|s| &s.user_id == user_id).count()
            + tables.alerts.iter().filter(|a| &a.user_id == user_id).count()
            + tables.integrations.values().filter(|i| &i.user_id == user_id).count()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Users
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::new(ErrorCode::EmailTaken, "Email already registered"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        let email = email.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_billing_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.billing_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn bind_billing_customer(
        &self,
        id: &UserId,
        customer_id: &str,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(id) {
            Some(user) if user.billing_customer_id.is_none() => {
                user.billing_customer_id = Some(customer_id.to_string());
                user.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.users.remove(id).is_none() {
            return Ok(false);
        }
        tables.sessions.retain(|_, s| &s.user_id != id);
        tables.subscriptions.retain(|_, s| &s.user_id != id);
        tables.alerts.retain(|a| &a.user_id != id);
        tables.integrations.retain(|_, i| &i.user_id != id);
        Ok(true)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Sessions
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn insert(&self, session: &Session) -> Result<(), DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.sessions.contains_key(&session.token) {
            return Err(DomainError::new(ErrorCode::DuplicateSession, "Session token already exists"));
        }
        tables.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<Session>, DomainError> {
        self.check_available()?;
        Ok(self.tables.read().await.sessions.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        Ok(self.tables.write().await.sessions.remove(token).is_some())
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.expires_at.is_before(&now));
        Ok((before - tables.sessions.len()) as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Entitlements
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl EntitlementStore for InMemoryStore {
    async fn create_or_update(
        &self,
        user_id: &UserId,
        change: &SubscriptionChange,
        now: Timestamp,
    ) -> Result<SubscriptionTransition, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        let transition = match tables.subscription_id_by_billing_id(&change.billing_subscription_id) {
            Some(id) => {
                let row = tables
                    .subscriptions
                    .get_mut(&id)
                    .ok_or_else(|| DomainError::new(ErrorCode::InternalError, "row vanished"))?;
                let previous = row.clone();
                let result = row.apply(change, now);
                SubscriptionTransition {
                    previous: Some(previous),
                    current: row.clone(),
                    result,
                    integrations_deactivated: 0,
                }
            }
            None => {
                let row = Subscription::from_change(*user_id, change, now);
                tables.subscriptions.insert(row.id, row.clone());
                SubscriptionTransition {
                    previous: None,
                    current: row,
                    result: ApplyResult::Applied,
                    integrations_deactivated: 0,
                }
            }
        };

        if !transition.is_stale() {
            let owner = transition.current.user_id;
            tables.set_account_status(&owner, AccountStatus::from_billing(&change.status), now);
        }
        Ok(transition)
    }

    async fn update_existing(
        &self,
        change: &SubscriptionChange,
        now: Timestamp,
    ) -> Result<Option<SubscriptionTransition>, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        let Some(id) = tables.subscription_id_by_billing_id(&change.billing_subscription_id) else {
            return Ok(None);
        };
        let Some(row) = tables.subscriptions.get_mut(&id) else {
            return Ok(None);
        };

        let previous = row.clone();
        let result = row.apply(change, now);
        let transition = SubscriptionTransition {
            previous: Some(previous),
            current: row.clone(),
            result,
            integrations_deactivated: 0,
        };

        if !transition.is_stale() {
            let owner = transition.current.user_id;
            tables.set_account_status(&owner, AccountStatus::from_billing(&change.status), now);
        }
        Ok(Some(transition))
    }

    async fn cancel(
        &self,
        billing_subscription_id: &str,
        event_at: Timestamp,
        now: Timestamp,
    ) -> Result<Option<SubscriptionTransition>, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        let Some(id) = tables.subscription_id_by_billing_id(billing_subscription_id) else {
            return Ok(None);
        };
        let Some(row) = tables.subscriptions.get_mut(&id) else {
            return Ok(None);
        };

        let previous = row.clone();
        let result = row.cancel(event_at, now);
        let mut transition = SubscriptionTransition {
            previous: Some(previous),
            current: row.clone(),
            result,
            integrations_deactivated: 0,
        };

        if !transition.is_stale() {
            let owner = transition.current.user_id;
            tables.set_account_status(&owner, AccountStatus::Free, now);

            let mut deactivated = 0;
            for integration in tables
                .integrations
                .values_mut()
                .filter(|i| i.user_id == owner && i.is_premium && i.is_active)
            {
                integration.deactivate(now);
                deactivated += 1;
            }
            transition.integrations_deactivated = deactivated;
        }
        Ok(Some(transition))
    }

    async fn find_by_billing_id(
        &self,
        billing_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .subscriptions
            .values()
            .find(|s| s.billing_subscription_id.as_deref() == Some(billing_subscription_id))
            .cloned())
    }

    async fn current_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| &s.user_id == user_id && s.is_active_like())
            .max_by_key(|s| s.created_at)
            .cloned())
    }

}

// ════════════════════════════════════════════════════════════════════════════════
// Alerts
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl AlertSink for InMemoryStore {
    async fn append(&self, alert: &Alert) -> Result<(), DomainError> {
        self.check_available()?;
        self.tables.write().await.alerts.push(alert.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId, limit: u32) -> Result<Vec<Alert>, DomainError> {
        self.check_available()?;
        // Appended in time order; newest first means reverse.
        Ok(self
            .tables
            .read()
            .await
            .alerts
            .iter()
            .rev()
            .filter(|a| &a.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, DomainError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .alerts
            .iter()
            .filter(|a| &a.user_id == user_id && !a.is_read)
            .count() as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Integrations
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl IntegrationRepository for InMemoryStore {
    async fn save(&self, integration: &Integration) -> Result<(), DomainError> {
        self.check_available()?;
        self.tables
            .write()
            .await
            .integrations
            .insert(integration.id, integration.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Integration>, DomainError> {
        self.check_available()?;
        let mut rows: Vec<Integration> = self
            .tables
            .read()
            .await
            .integrations
            .values()
            .filter(|i| &i.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Processed webhook events
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl WebhookEventRepository for InMemoryStore {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        self.check_available()?;
        Ok(self.tables.read().await.webhook_events.get(event_id).cloned())
    }

    async fn claim(
        &self,
        claim: WebhookEventRecord,
        stale_before: Timestamp,
    ) -> Result<ClaimResult, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        match tables.webhook_events.get(&claim.event_id) {
            Some(existing) if !existing.is_pending() => return Ok(ClaimResult::Completed),
            Some(existing) if !existing.processed_at.is_before(&stale_before) => {
                return Ok(ClaimResult::InFlight)
            }
            _ => {}
        }
        tables.webhook_events.insert(claim.event_id.clone(), claim);
        Ok(ClaimResult::Acquired)
    }

    async fn complete(&self, record: WebhookEventRecord) -> Result<(), DomainError> {
        self.check_available()?;
        self.tables
            .write()
            .await
            .webhook_events
            .insert(record.event_id.clone(), record);
        Ok(())
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.webhook_events.get(event_id).is_some_and(|r| r.is_pending()) {
            tables.webhook_events.remove(event_id);
        }
        Ok(())
    }
}
