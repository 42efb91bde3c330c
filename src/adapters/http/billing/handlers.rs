//! HTTP handler for billing webhook deliveries.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::adapters::http::AppState;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// `POST /webhooks/billing`
///
/// Every failure is a server error so the processor redelivers; retryable
/// storage failures answer 503, everything else 500. Handled, skipped,
/// stale and duplicate events all answer 200.
pub async fn billing_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    match state.webhooks.receive(&body, signature).await {
        Ok(result) => Json(serde_json::json!({
            "received": true,
            "outcome": result.outcome_name()
        }))
        .into_response(),
        Err(e) => (
            e.status_code(),
            Json(serde_json::json!({
                "error": e.to_string(),
                "code": if e.is_retryable() { "RETRYABLE" } else { "WEBHOOK_FAILED" }
            })),
        )
            .into_response(),
    }
}

/// # Routes
///
/// - `POST /billing` - Billing processor events
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/billing", post(billing_webhook))
}
