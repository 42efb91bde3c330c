//! Billing webhook reconciliation errors.
//!
//! Defines every way an inbound billing event can fail, with HTTP status
//! mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur while verifying or reconciling a billing event.
///
/// Soft misses (unknown customer, no matching row) are not errors; they are
/// reported through `ReconcileOutcome`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Signature did not match the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    /// A secret is configured but the delivery carried no signature header.
    #[error("Missing signature header")]
    MissingSignature,

    /// Signature timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signature timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header or JSON payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the event object.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Storage was unreachable or timed out.
    #[error("Database error: {0}")]
    Database(String),

    /// Storage rejected the write for a non-transient reason.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Another delivery of the same event holds the processing claim.
    #[error("Event {0} is already being processed")]
    InFlight(String),
}

impl ReconcileError {
    /// Returns true if the failure is transient and redelivery may succeed.
    ///
    /// Retryable failures are never recorded as processed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReconcileError::Database(_) | ReconcileError::InFlight(_))
    }

    /// Maps the error to the HTTP status returned to the billing processor.
    ///
    /// Every failure is a server error so the processor redelivers:
    /// - 503: transient storage failure, or a concurrent delivery in flight
    /// - 500: verification, parsing and other fatal-to-event failures
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReconcileError::Database(_) | ReconcileError::InFlight(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ReconcileError::InvalidSignature
            | ReconcileError::MissingSignature
            | ReconcileError::TimestampOutOfRange
            | ReconcileError::InvalidTimestamp
            | ReconcileError::ParseError(_)
            | ReconcileError::MissingField(_)
            | ReconcileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ReconcileError {
    fn from(err: DomainError) -> Self {
        if err.is_retryable() {
            ReconcileError::Database(err.to_string())
        } else {
            ReconcileError::Internal(err.to_string())
        }
    }
}
