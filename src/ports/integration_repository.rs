//! Integration repository port.
//!
//! Deactivation on cancellation goes through `EntitlementStore::cancel` so
//! it shares that transaction; this port covers creation and reads.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::integration::Integration;

#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    async fn save(&self, integration: &Integration) -> Result<(), DomainError>;

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Integration>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn IntegrationRepository) {}
    }
}
