//! saas-core - Sessions, entitlements and billing reconciliation for a
//! multi-tenant SaaS backend.
//!
//! Validates bearer sessions, keeps subscription state in step with a
//! billing processor's webhook stream, and raises user-facing alerts for
//! billing transitions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
