//! HTTP handlers for account endpoints.

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::dto::{
    AlertsParams, AlertsResponse, ConnectIntegrationRequest, IntegrationsResponse, MeResponse,
};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::application::handlers::alerts::ListAlertsQuery;
use crate::application::handlers::integration::ConnectIntegrationCommand;

/// `GET /api/me` - account status and current plan.
pub async fn get_me(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.entitlements.entitlement(&session.user_id).await?;
    Ok(Json(MeResponse::from(view)))
}

/// `GET /api/alerts?limit=N` - newest alerts first.
pub async fn list_alerts(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(params): Query<AlertsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .alerts
        .handle(ListAlertsQuery {
            user_id: session.user_id,
            limit: params.limit,
        })
        .await?;
    Ok(Json(AlertsResponse::from(result)))
}

/// `GET /api/integrations` - connected integrations, oldest first.
pub async fn list_integrations(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let integrations = state.integrations.list(&session.user_id).await?;
    Ok(Json(IntegrationsResponse { integrations }))
}

/// `POST /api/integrations` - connect one. Premium needs a paid plan.
pub async fn connect_integration(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Json(req): Json<ConnectIntegrationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let integration = state
        .integrations
        .connect(ConnectIntegrationCommand {
            user_id: session.user_id,
            provider: req.provider,
            name: req.name,
            is_premium: req.is_premium,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(integration)))
}
