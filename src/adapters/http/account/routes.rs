//! Axum router configuration for account endpoints.

use axum::{middleware, routing::get, Router};

use super::handlers::{connect_integration, get_me, list_alerts, list_integrations};
use crate::adapters::http::middleware::auth_middleware;
use crate::adapters::http::AppState;

/// # Routes (all require authentication)
///
/// - `GET /me` - Entitlement view
/// - `GET /alerts` - Alerts and unread count
/// - `GET /integrations` - Connected integrations
/// - `POST /integrations` - Connect an integration
pub fn account_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/alerts", get(list_alerts))
        .route("/integrations", get(list_integrations).post(connect_integration))
        .route_layer(middleware::from_fn_with_state(state.guard.clone(), auth_middleware))
}
