//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types shared by the
//! session, subscription and billing modules.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::AuthError;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AlertId, IntegrationId, SubscriptionId, UserId};
pub use timestamp::Timestamp;
