//! HTTP adapter for billing processor webhooks.
//!
//! No user authentication: deliveries are authenticated by signature.

mod handlers;

pub use handlers::{billing_webhook, webhook_routes, SIGNATURE_HEADER};
