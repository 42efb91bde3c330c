//! Request and response bodies for session endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::auth::{IssuedSession, LoginCommand, RegisterCommand};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::user::{AccountStatus, User};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl From<RegisterRequest> for RegisterCommand {
    fn from(req: RegisterRequest) -> Self {
        RegisterCommand {
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            company_name: req.company_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl From<LoginRequest> for LoginCommand {
    fn from(req: LoginRequest) -> Self {
        LoginCommand {
            email: req.email,
            password: req.password,
        }
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub company_name: Option<String>,
    pub subscription_status: AccountStatus,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            company_name: user.company_name.clone(),
            subscription_status: user.subscription_status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl From<IssuedSession> for SessionResponse {
    fn from(session: IssuedSession) -> Self {
        Self {
            token: session.token,
            user_id: session.user_id,
            expires_at: session.expires_at,
            user: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_company_is_optional() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email": "a@x.com", "password": "long enough", "display_name": "A"}"#,
        )
        .unwrap();
        assert!(req.company_name.is_none());
    }

    #[test]
    fn user_response_omits_password_hash() {
        let user = User::register("a@x.com", "$argon2id$secret".into(), "A", None, Timestamp::now())
            .unwrap();
        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"subscription_status\":\"free\""));
    }
}
