//! Axum router configuration for session endpoints.

use axum::{middleware, routing::post, Router};

use super::handlers::{login, logout, register};
use crate::adapters::http::middleware::auth_middleware;
use crate::adapters::http::AppState;

/// # Routes
///
/// - `POST /register` - Create account, returns a session
/// - `POST /login` - Exchange credentials for a session
/// - `POST /logout` - Revoke the current session (requires authentication)
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(state.guard.clone(), auth_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}
