//! Subscription entity and event application rules.

use serde::{Deserialize, Serialize};

use super::{BillingStatus, PlanType};
use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};

/// Subscription fields carried by a created/updated billing event.
///
/// Applied wholesale: every field overwrites the stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionChange {
    pub billing_subscription_id: String,
    pub status: BillingStatus,
    pub plan_type: PlanType,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    /// Creation time of the event that produced this change.
    pub event_at: Timestamp,
}

/// Result of applying an event to an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    Applied,
    /// The event predates the last one applied; nothing changed.
    Stale,
}

/// One billing subscription owned by a user.
///
/// Rows are never deleted by reconciliation; cancellation keeps the row for
/// history. `last_event_at` orders competing events for the same row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub billing_subscription_id: Option<String>,
    pub status: BillingStatus,
    pub plan_type: PlanType,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub last_event_at: Timestamp,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates a new row from the first event seen for a billing subscription.
    pub fn from_change(user_id: UserId, change: &SubscriptionChange, now: Timestamp) -> Self {
        Self {
            id: SubscriptionId::new(),
            user_id,
            billing_subscription_id: Some(change.billing_subscription_id.clone()),
            status: change.status.clone(),
            plan_type: change.plan_type,
            current_period_start: change.current_period_start,
            current_period_end: change.current_period_end,
            cancel_at_period_end: change.cancel_at_period_end,
            last_event_at: change.event_at,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the row from an event unless the event is older than the
    /// last one applied. Equal timestamps apply, so redelivery is a no-op in
    /// effect.
    pub fn apply(&mut self, change: &SubscriptionChange, now: Timestamp) -> ApplyResult {
        if change.event_at.is_before(&self.last_event_at) {
            return ApplyResult::Stale;
        }

        self.status = change.status.clone();
        self.plan_type = change.plan_type;
        self.current_period_start = change.current_period_start;
        self.current_period_end = change.current_period_end;
        self.cancel_at_period_end = change.cancel_at_period_end;
        self.touch(change.event_at, now);
        ApplyResult::Applied
    }

    /// Marks the row canceled, keeping it for history.
    pub fn cancel(&mut self, event_at: Timestamp, now: Timestamp) -> ApplyResult {
        if event_at.is_before(&self.last_event_at) {
            return ApplyResult::Stale;
        }

        self.status = BillingStatus::Canceled;
        self.cancel_at_period_end = false;
        self.touch(event_at, now);
        ApplyResult::Applied
    }

    pub fn is_active_like(&self) -> bool {
        self.status.is_active_like()
    }

    fn touch(&mut self, event_at: Timestamp, now: Timestamp) {
        self.last_event_at = event_at;
        self.version += 1;
        self.updated_at = now;
    }
}
