//! IntegrationHandler - Lists and connects a user's integrations.
//!
//! Premium integrations need an active-like subscription at connect time.
//! They are switched off again when that subscription is deleted, inside
//! `EntitlementStore::cancel`.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::integration::Integration;
use crate::ports::{Clock, EntitlementStore, IntegrationRepository};

#[derive(Debug, Clone)]
pub struct ConnectIntegrationCommand {
    pub user_id: UserId,
    pub provider: String,
    pub name: String,
    pub is_premium: bool,
}

pub struct IntegrationHandler {
    integrations: Arc<dyn IntegrationRepository>,
    entitlements: Arc<dyn EntitlementStore>,
    clock: Arc<dyn Clock>,
}

impl IntegrationHandler {
    pub fn new(
        integrations: Arc<dyn IntegrationRepository>,
        entitlements: Arc<dyn EntitlementStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            integrations,
            entitlements,
            clock,
        }
    }

    /// Oldest first.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Integration>, DomainError> {
        self.integrations.list_for_user(user_id).await
    }

    pub async fn connect(
        &self,
        cmd: ConnectIntegrationCommand,
    ) -> Result<Integration, DomainError> {
        let integration = Integration::new(
            cmd.user_id,
            &cmd.provider,
            &cmd.name,
            cmd.is_premium,
            self.clock.now(),
        )?;

        if integration.is_premium
            && self
                .entitlements
                .current_subscription(&cmd.user_id)
                .await?
                .is_none()
        {
            return Err(DomainError::new(
                ErrorCode::PlanRequired,
                "Premium integrations require an active subscription",
            ));
        }

        self.integrations.save(&integration).await?;

        tracing::info!(
            user_id = %integration.user_id,
            integration_id = %integration.id,
            provider = %integration.provider,
            is_premium = integration.is_premium,
            "Integration connected"
        );
        Ok(integration)
    }
}
