//! Alert handlers.

mod emit_alert;
mod list_alerts;

pub use emit_alert::AlertEmitter;
pub use list_alerts::{ListAlertsHandler, ListAlertsQuery, ListAlertsResult, MAX_ALERT_PAGE};
