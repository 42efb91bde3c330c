//! User repository port.
//!
//! Emails are stored lower-cased; lookups by email expect a normalized
//! address.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::user::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// - `EmailTaken` if the email is already registered
    /// - `DatabaseError` on persistence failure
    async fn create(&self, user: &User) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Finds the user bound to a billing customer reference.
    async fn find_by_billing_customer(&self, customer_id: &str)
        -> Result<Option<User>, DomainError>;

    /// Binds a billing customer reference to a user that has none yet.
    ///
    /// Returns `false` (and changes nothing) if the user already has a
    /// reference or does not exist.
    async fn bind_billing_customer(
        &self,
        id: &UserId,
        customer_id: &str,
        now: Timestamp,
    ) -> Result<bool, DomainError>;

    /// Deletes a user and, by cascade, its sessions, subscriptions, alerts
    /// and integrations. Returns `false` if no such user existed.
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;
}
