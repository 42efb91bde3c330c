//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `user` - Accounts and user-facing subscription status
//! - `session` - Session records and signed token claims
//! - `subscription` - Entitlement state derived from billing events
//! - `alert` - User-facing notifications
//! - `integration` - Third-party integrations, some premium-only
//! - `billing` - Billing event verification and idempotent processing

pub mod alert;
pub mod billing;
pub mod foundation;
pub mod integration;
pub mod session;
pub mod subscription;
pub mod user;
