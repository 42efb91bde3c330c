//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `SAAS_CORE` prefix and
//! `__` between nesting levels.
//!
//! Configuration objects are handed to the session guard, webhook intake
//! and sweeper at construction; nothing below `main` reads the environment.
//!
//! # Example
//!
//! ```no_run
//! use saas_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod billing;
mod database;
mod error;
mod server;

pub use auth::{AuthConfig, MIN_SESSION_SECRET_BYTES};
pub use billing::BillingConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::application::handlers::auth::SessionGuardConfig;
use crate::application::handlers::billing::WebhookIntakeConfig;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Session token configuration
    pub auth: AuthConfig,

    /// Billing webhook configuration
    #[serde(default)]
    pub billing: BillingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SAAS_CORE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SAAS_CORE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SAAS_CORE__AUTH__SESSION_SECRET=...` -> `auth.session_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SAAS_CORE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Production additionally requires a webhook secret and a session
    /// secret of at least `MIN_SESSION_SECRET_BYTES`. Queries must time out
    /// before requests do so lock waits surface as retryable errors.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.billing.validate(&self.server.environment)?;
        if self.database.statement_timeout() >= self.server.request_timeout() {
            return Err(ValidationError::StatementTimeoutTooLong);
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    pub fn session_guard_config(&self) -> SessionGuardConfig {
        SessionGuardConfig {
            session_ttl_secs: self.auth.session_ttl_secs,
            token_issuer: self.auth.token_issuer.clone(),
        }
    }

    pub fn webhook_intake_config(&self) -> WebhookIntakeConfig {
        WebhookIntakeConfig {
            webhook_secret: self.billing.webhook_secret(),
            tolerance_secs: self.billing.signature_tolerance_secs,
        }
    }
}
