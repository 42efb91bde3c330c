//! Argon2id implementation of the `CredentialVerifier` port.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::CredentialVerifier;

#[derive(Debug, Clone, Default)]
pub struct Argon2CredentialVerifier;

impl Argon2CredentialVerifier {
    pub fn new() -> Self {
        Self
    }
}

fn internal(message: String) -> DomainError {
    DomainError::new(ErrorCode::InternalError, message)
}

#[async_trait]
impl CredentialVerifier for Argon2CredentialVerifier {
    async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut rand::thread_rng());
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| internal(format!("Failed to hash password: {}", e)))
        })
        .await
        .map_err(|e| internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|e| internal(format!("Stored hash is malformed: {}", e)))?;
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| internal(format!("Verification task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let verifier = Argon2CredentialVerifier::new();
        let hash = verifier.hash("correct horse").await.unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verifier.verify("correct horse", &hash).await.unwrap());
        assert!(!verifier.verify("battery staple", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let verifier = Argon2CredentialVerifier::new();
        let a = verifier.hash("pw123456").await.unwrap();
        let b = verifier.hash("pw123456").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let verifier = Argon2CredentialVerifier::new();
        assert!(verifier.verify("pw", "not-a-hash").await.is_err());
    }
}
