//! Entitlement store port.
//!
//! The only write path for subscription rows and `User.subscription_status`.
//! Every write method is a single transaction covering the subscription row
//! and the owning user, so the two never drift.
//!
//! # Contention
//!
//! The row for one billing subscription reference is the unit of
//! contention. Implementations must serialize read-modify-write on that row
//! (row lock or equivalent) and apply the stale-event rule from
//! `Subscription::apply` inside the same transaction.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::{ApplyResult, Subscription, SubscriptionChange};

/// Before/after view of one reconciled row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionTransition {
    /// Row state before this event, `None` when the row was created.
    pub previous: Option<Subscription>,
    /// Row state after this event (unchanged when stale).
    pub current: Subscription,
    pub result: ApplyResult,
    /// Premium integrations switched off by a cancellation.
    pub integrations_deactivated: u64,
}

impl SubscriptionTransition {
    pub fn is_stale(&self) -> bool {
        self.result == ApplyResult::Stale
    }
}

#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Inserts or updates the row keyed by `change.billing_subscription_id`
    /// and sets the owner's account status from `change.status`.
    ///
    /// An existing row keeps its owner.
    async fn create_or_update(
        &self,
        user_id: &UserId,
        change: &SubscriptionChange,
        now: Timestamp,
    ) -> Result<SubscriptionTransition, DomainError>;

    /// Updates an existing row and its owner's account status.
    ///
    /// Returns `None` if no row matches.
    async fn update_existing(
        &self,
        change: &SubscriptionChange,
        now: Timestamp,
    ) -> Result<Option<SubscriptionTransition>, DomainError>;

    /// Marks a row canceled, sets its owner to `free` and deactivates the
    /// owner's premium-only integrations.
    ///
    /// Returns `None` if no row matches.
    async fn cancel(
        &self,
        billing_subscription_id: &str,
        event_at: Timestamp,
        now: Timestamp,
    ) -> Result<Option<SubscriptionTransition>, DomainError>;

    async fn find_by_billing_id(
        &self,
        billing_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Most recently created active-like row for the user, read in one
    /// statement.
    async fn current_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError>;
}
