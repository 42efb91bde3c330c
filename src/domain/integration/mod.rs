//! Integration domain module.
//!
//! Third-party connections owned by a user. Premium-only integrations are
//! switched off when the owning subscription is deleted.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{IntegrationId, Timestamp, UserId, ValidationError};

/// A connected third-party integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    pub id: IntegrationId,
    pub user_id: UserId,
    pub provider: String,
    pub name: String,
    pub is_premium: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Integration {
    pub fn new(
        user_id: UserId,
        provider: &str,
        name: &str,
        is_premium: bool,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        if provider.trim().is_empty() {
            return Err(ValidationError::empty_field("provider"));
        }
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        Ok(Self {
            id: IntegrationId::new(),
            user_id,
            provider: provider.trim().to_string(),
            name: name.trim().to_string(),
            is_premium,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn deactivate(&mut self, now: Timestamp) {
        if self.is_active {
            self.is_active = false;
            self.updated_at = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_integration_is_active() {
        let i = Integration::new(UserId::new(), "slack", "Team Slack", true, Timestamp::now()).unwrap();
        assert!(i.is_active);
        assert!(i.is_premium);
    }

    #[test]
    fn rejects_blank_provider() {
        assert!(Integration::new(UserId::new(), " ", "x", false, Timestamp::now()).is_err());
    }

    #[test]
    fn deactivate_is_idempotent() {
        let created = Timestamp::from_unix_secs(100).unwrap();
        let mut i = Integration::new(UserId::new(), "github", "Repo sync", true, created).unwrap();

        i.deactivate(created.plus_secs(10));
        assert!(!i.is_active);
        assert_eq!(i.updated_at, created.plus_secs(10));

        i.deactivate(created.plus_secs(20));
        assert_eq!(i.updated_at, created.plus_secs(10));
    }
}
