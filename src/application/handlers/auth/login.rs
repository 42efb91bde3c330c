//! LoginHandler - Command handler for password login.

use std::sync::Arc;
use thiserror::Error;

use super::{IssuedSession, SessionGuard};
use crate::domain::foundation::DomainError;
use crate::ports::{CredentialVerifier, UserRepository};

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// Unknown email and wrong password are indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<DomainError> for LoginError {
    fn from(err: DomainError) -> Self {
        LoginError::Infrastructure(err.to_string())
    }
}

/// Handler for logging in with email and password.
pub struct LoginHandler {
    users: Arc<dyn UserRepository>,
    credentials: Arc<dyn CredentialVerifier>,
    guard: Arc<SessionGuard>,
}

impl LoginHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        credentials: Arc<dyn CredentialVerifier>,
        guard: Arc<SessionGuard>,
    ) -> Self {
        Self {
            users,
            credentials,
            guard,
        }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<IssuedSession, LoginError> {
        let email = cmd.email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        if !self.credentials.verify(&cmd.password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "Login rejected: bad password");
            return Err(LoginError::InvalidCredentials);
        }

        let session = self.guard.issue(user.id).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(session)
    }
}
