//! RegisterHandler - Command handler for account registration.

use std::sync::Arc;
use thiserror::Error;

use super::{IssuedSession, SessionGuard};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::{normalize_email, User};
use crate::ports::{Clock, CredentialVerifier, UserRepository};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Command to register a new account.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub company_name: Option<String>,
}

/// Result of successful registration.
#[derive(Debug, Clone)]
pub struct RegisterResult {
    pub user: User,
    pub session: IssuedSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<DomainError> for RegistrationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EmailTaken => RegistrationError::EmailTaken,
            ErrorCode::ValidationFailed => RegistrationError::Validation(err.message),
            _ => RegistrationError::Infrastructure(err.to_string()),
        }
    }
}

/// Handler for registering accounts.
///
/// New accounts start on the free status with no billing reference and
/// receive a session immediately.
pub struct RegisterHandler {
    users: Arc<dyn UserRepository>,
    credentials: Arc<dyn CredentialVerifier>,
    guard: Arc<SessionGuard>,
    clock: Arc<dyn Clock>,
}

impl RegisterHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        credentials: Arc<dyn CredentialVerifier>,
        guard: Arc<SessionGuard>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            credentials,
            guard,
            clock,
        }
    }

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<RegisterResult, RegistrationError> {
        if cmd.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistrationError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let email = normalize_email(&cmd.email)
            .map_err(|e| RegistrationError::Validation(e.to_string()))?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(RegistrationError::EmailTaken);
        }

        let password_hash = self.credentials.hash(&cmd.password).await?;
        let user = User::register(
            &email,
            password_hash,
            &cmd.display_name,
            cmd.company_name,
            self.clock.now(),
        )
        .map_err(|e| RegistrationError::Validation(e.to_string()))?;

        // A concurrent registration can still win the unique index.
        self.users.create(&user).await?;

        let session = self.guard.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(RegisterResult { user, session })
    }
}
