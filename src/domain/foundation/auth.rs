//! Authentication errors for the session guard.
//!
//! Each variant carries a stable machine-readable reason code so callers
//! can switch on it without parsing messages. All four session failures are
//! surfaced as "unauthenticated"; only `ServiceUnavailable` is transient.

use thiserror::Error;

use super::DomainError;

/// Reasons a bearer token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No bearer token was supplied.
    #[error("Missing bearer token")]
    MissingToken,

    /// The token is malformed, has a bad signature, or names a different
    /// user than the session it maps to.
    #[error("Invalid token")]
    InvalidToken,

    /// The token is well formed but no session record exists for it
    /// (logged out or never issued).
    #[error("Unknown session")]
    UnknownSession,

    /// The session record exists but its expiry has passed.
    #[error("Session expired")]
    ExpiredSession,

    /// The session store could not be reached.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Stable reason code returned to HTTP clients.
    pub fn reason_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::UnknownSession => "UNKNOWN_SESSION",
            AuthError::ExpiredSession => "EXPIRED_SESSION",
            AuthError::ServiceUnavailable(_) => "AUTH_UNAVAILABLE",
        }
    }

    /// Returns true if the client must log in again.
    pub fn requires_reauthentication(&self) -> bool {
        !self.is_transient()
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        AuthError::ServiceUnavailable(err.to_string())
    }
}
