//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT token codec and Argon2 password hashing
//! - `http` - axum REST surface and webhook endpoint
//! - `memory` - In-memory store and manual clock for tests and local runs
//! - `postgres` - sqlx-backed repositories

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
