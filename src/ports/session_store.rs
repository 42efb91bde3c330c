//! Session store port.
//!
//! Persisted mapping of literal token string to session record. Every
//! deletion is delete-if-exists: lazy expiry on access and the periodic
//! sweep may race on the same row.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::session::Session;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts a new session.
    ///
    /// # Errors
    ///
    /// - `DuplicateSession` if the token already exists
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, session: &Session) -> Result<(), DomainError>;

    async fn find(&self, token: &str) -> Result<Option<Session>, DomainError>;

    /// Deletes a session. Returns `false` if it was already gone.
    async fn delete(&self, token: &str) -> Result<bool, DomainError>;

    /// Deletes every session with `expires_at < now`. Returns the count.
    async fn delete_expired(&self, now: Timestamp) -> Result<u64, DomainError>;
}
