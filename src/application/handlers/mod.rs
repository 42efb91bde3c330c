//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod alerts;
pub mod auth;
pub mod billing;
pub mod entitlement;
pub mod integration;
