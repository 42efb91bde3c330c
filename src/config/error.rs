//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address")]
    InvalidBindAddress,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool size must be 1..=100 with min_connections <= max_connections")]
    InvalidPoolSize,

    #[error("Database statement timeout must be shorter than the request timeout")]
    StatementTimeoutTooLong,

    #[error("Session secret must be at least {0} bytes in production")]
    SessionSecretTooShort(usize),

    #[error("Session TTL must be positive")]
    InvalidSessionTtl,

    #[error("Sweep interval must be positive")]
    InvalidSweepInterval,

    #[error("Billing webhook secret is required in production")]
    WebhookSecretRequired,

    #[error("Signature tolerance must be between 1 and 3600 seconds")]
    InvalidSignatureTolerance,
}
