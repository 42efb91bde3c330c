//! EntitlementQueries - Read path for plan and account status.
//!
//! `current_plan` is derived from one store read (the newest active-like
//! subscription row), so a concurrent reconciliation can never produce a
//! plan from one row version and a status from another.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::subscription::{PlanType, Subscription};
use crate::domain::user::AccountStatus;
use crate::ports::{EntitlementStore, UserRepository};

/// Snapshot of a user's entitlement for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementView {
    pub user_id: UserId,
    pub account_status: AccountStatus,
    pub plan: PlanType,
}

pub struct EntitlementQueries {
    users: Arc<dyn UserRepository>,
    entitlements: Arc<dyn EntitlementStore>,
}

impl EntitlementQueries {
    pub fn new(users: Arc<dyn UserRepository>, entitlements: Arc<dyn EntitlementStore>) -> Self {
        Self { users, entitlements }
    }

    /// Plan of the most recently created active-like subscription, else free.
    pub async fn current_plan(&self, user_id: &UserId) -> Result<PlanType, DomainError> {
        Ok(self
            .entitlements
            .current_subscription(user_id)
            .await?
            .map(|s| s.plan_type)
            .unwrap_or_default())
    }

    pub async fn current_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        self.entitlements.current_subscription(user_id).await
    }

    /// Read-through of `User.subscription_status`.
    pub async fn account_status(&self, user_id: &UserId) -> Result<AccountStatus, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| u.subscription_status)
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))
    }

    pub async fn entitlement(&self, user_id: &UserId) -> Result<EntitlementView, DomainError> {
        let account_status = self.account_status(user_id).await?;
        let plan = self.current_plan(user_id).await?;
        Ok(EntitlementView {
            user_id: *user_id,
            account_status,
            plan,
        })
    }
}
