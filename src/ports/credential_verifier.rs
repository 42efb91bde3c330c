//! Credential verifier port.
//!
//! Opaque one-way password hashing. The session layer never sees the
//! algorithm, only the encoded hash string.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Hashes a plaintext password into a self-describing encoded string.
    async fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Returns true if `password` matches `hash`.
    ///
    /// A malformed hash is reported as a mismatch, not an error.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}
