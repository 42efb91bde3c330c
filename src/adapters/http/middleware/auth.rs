//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that validates Bearer tokens through the
//!   `SessionGuard` and injects the session into extensions
//! - `RequireAuth` - Extractor for handlers behind the middleware
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedSession into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```
//!
//! Every failure answers with `{"error": <message>, "code": <reason>}`:
//! 401 for the four session reasons, 503 `AUTH_UNAVAILABLE` when the
//! session store cannot be reached.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::auth::SessionGuard;
use crate::domain::foundation::{AuthError, UserId};

/// Auth middleware state.
pub type AuthState = Arc<SessionGuard>;

/// A validated session, injected by `auth_middleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub user_id: UserId,
    /// Raw bearer token, kept so logout can revoke it.
    pub token: String,
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Authentication middleware for protected routes.
///
/// A missing token is rejected here with `MISSING_TOKEN`; routes that do
/// not need a session are simply not wrapped in this layer.
pub async fn auth_middleware(
    State(guard): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers()).map(str::to_owned);

    match guard.authenticate(token.as_deref()).await {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthenticatedSession {
                user_id,
                token: token.unwrap_or_default(),
            });
            next.run(request).await
        }
        Err(e) => AuthRejection::Rejected(e).into_response(),
    }
}

/// Extractor that requires authentication.
///
/// ```ignore
/// async fn my_handler(RequireAuth(session): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", session.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedSession);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSession>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// The route was reached without the auth middleware having run.
    Unauthenticated,
    /// The session guard refused the token.
    Rejected(AuthError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message, code) = match &self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
                AuthError::MissingToken.reason_code(),
            ),
            AuthRejection::Rejected(e) if e.is_transient() => {
                tracing::error!(error = %e, "Auth service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Authentication service unavailable".to_string(),
                    e.reason_code(),
                )
            }
            AuthRejection::Rejected(e) => (StatusCode::UNAUTHORIZED, e.to_string(), e.reason_code()),
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": code
            })),
        )
            .into_response()
    }
}
