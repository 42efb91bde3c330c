//! HTTP adapters - REST API implementations.
//!
//! ```text
//! /health                  liveness
//! /api/auth/{register,login,logout}
//! /api/{me,alerts,integrations}  authenticated
//! /webhooks/billing        signature-verified
//! ```

pub mod account;
pub mod auth;
pub mod billing;
pub mod error;
pub mod middleware;
mod state;

pub use state::{AppPorts, AppState};

use std::time::Duration;

use axum::{routing::get, Json, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Builds the complete application router.
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .nest("/auth", auth::auth_routes(&state))
        .merge(account::account_routes(&state));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .nest("/webhooks", billing::webhook_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
