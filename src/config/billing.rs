//! Billing webhook configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Billing webhook configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Webhook signing secret. Absent means development mode (unverified).
    #[serde(default)]
    pub webhook_secret: Option<SecretString>,

    /// Maximum signature age in seconds
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,
}

impl BillingConfig {
    /// The secret, treating an empty value as absent.
    pub fn webhook_secret(&self) -> Option<SecretString> {
        self.webhook_secret
            .as_ref()
            .filter(|s| !s.expose_secret().trim().is_empty())
            .cloned()
    }

    /// Validate billing configuration
    ///
    /// Production refuses to start without a webhook secret.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && self.webhook_secret().is_none() {
            return Err(ValidationError::WebhookSecretRequired);
        }
        if !(1..=3600).contains(&self.signature_tolerance_secs) {
            return Err(ValidationError::InvalidSignatureTolerance);
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            signature_tolerance_secs: default_signature_tolerance(),
        }
    }
}

fn default_signature_tolerance() -> i64 {
    300
}
