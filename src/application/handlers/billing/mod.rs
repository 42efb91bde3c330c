//! Billing webhook handlers.
//!
//! - `WebhookIntake` - signature check, envelope parsing, dedup
//! - `BillingEventReconciler` - per-kind state transitions and alerts

mod receive_webhook;
mod reconcile_event;

pub use receive_webhook::{WebhookIntake, WebhookIntakeConfig};
pub use reconcile_event::BillingEventReconciler;
