//! HTTP handlers for session endpoints.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::dto::{LoginRequest, RegisterRequest, SessionResponse, UserResponse};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;

/// `POST /api/auth/register` - create an account and log it in.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.register.handle(req.into()).await?;

    let mut body = SessionResponse::from(result.session);
    body.user = Some(UserResponse::from(&result.user));
    Ok((StatusCode::CREATED, Json(body)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.login.handle(req.into()).await?;
    Ok(Json(SessionResponse::from(session)))
}

/// `POST /api/auth/logout` - revoke the presented token.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    state.guard.revoke(&session.token).await?;
    tracing::info!(user_id = %session.user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}
