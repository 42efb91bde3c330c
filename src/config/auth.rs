//! Session token configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum session secret length accepted in production.
pub const MIN_SESSION_SECRET_BYTES: usize = 32;

/// Session issuance and sweeping configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub session_secret: SecretString,

    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,

    /// `iss` claim written into and required on every token
    #[serde(default = "default_token_issuer")]
    pub token_issuer: String,

    /// Seconds between expired-session sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl AuthConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate authentication configuration
    ///
    /// In production the signing secret must be at least
    /// `MIN_SESSION_SECRET_BYTES` long.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret_len = self.session_secret.expose_secret().len();
        if secret_len == 0 {
            return Err(ValidationError::MissingRequired("AUTH__SESSION_SECRET"));
        }
        if *environment == Environment::Production && secret_len < MIN_SESSION_SECRET_BYTES {
            return Err(ValidationError::SessionSecretTooShort(MIN_SESSION_SECRET_BYTES));
        }
        if self.session_ttl_secs <= 0 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        if self.token_issuer.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__TOKEN_ISSUER"));
        }
        Ok(())
    }
}

fn default_session_ttl() -> i64 {
    7 * 24 * 60 * 60
}

fn default_token_issuer() -> String {
    "saas-core".to_string()
}

fn default_sweep_interval() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            session_secret: SecretString::new(secret.to_string()),
            session_ttl_secs: default_session_ttl(),
            token_issuer: default_token_issuer(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = config("dev-secret");
        assert_eq!(config.session_ttl_secs, 604_800);
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_short_secret_allowed_in_development() {
        assert!(config("dev-secret").validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_short_secret_rejected_in_production() {
        assert_eq!(
            config("dev-secret").validate(&Environment::Production),
            Err(ValidationError::SessionSecretTooShort(32))
        );
        assert!(config(&"x".repeat(32)).validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_empty_secret_rejected_everywhere() {
        assert!(config("").validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let mut config = config("dev-secret");
        config.session_ttl_secs = 0;
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidSessionTtl)
        );
    }
}
