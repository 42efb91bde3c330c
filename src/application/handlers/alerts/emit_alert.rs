//! AlertEmitter - Alert writes on behalf of the reconciler.

use std::sync::Arc;

use crate::domain::alert::Alert;
use crate::domain::foundation::DomainError;
use crate::ports::AlertSink;

/// Appends alerts on behalf of the reconciler.
///
/// `emit` follows a committed state transition: a failed append is logged
/// at `error` and swallowed, the transition stays authoritative. `deliver`
/// is for events whose only effect is the alert, so failure propagates.
pub struct AlertEmitter {
    sink: Arc<dyn AlertSink>,
}

impl AlertEmitter {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self { sink }
    }

    /// Returns whether the alert was stored.
    pub async fn emit(&self, alert: Alert) -> bool {
        self.deliver(alert).await.is_ok()
    }

    /// Appends the alert and reports failure to the caller.
    pub async fn deliver(&self, alert: Alert) -> Result<(), DomainError> {
        match self.sink.append(&alert).await {
            Ok(()) => {
                tracing::debug!(
                    user_id = %alert.user_id,
                    kind = alert.kind.as_str(),
                    "Alert emitted"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    user_id = %alert.user_id,
                    kind = alert.kind.as_str(),
                    error = %e,
                    "Failed to store alert"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::alert::{AlertKind, AlertSeverity};
    use crate::domain::foundation::{Timestamp, UserId};
    use serde_json::json;

    fn alert(user_id: UserId) -> Alert {
        Alert::new(
            user_id,
            AlertKind::PaymentSucceeded,
            AlertSeverity::Success,
            "Payment received",
            "We received your payment of 10.00 USD.",
            json!({}),
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn emit_appends_alert() {
        let store = InMemoryStore::new();
        let emitter = AlertEmitter::new(Arc::new(store.clone()));
        let user_id = UserId::new();

        assert!(emitter.emit(alert(user_id)).await);
        assert_eq!(store.alert_count_for_user(&user_id).await, 1);
    }

    #[tokio::test]
    async fn emit_failure_is_swallowed() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        let emitter = AlertEmitter::new(Arc::new(store));

        assert!(!emitter.emit(alert(UserId::new())).await);
    }

    #[tokio::test]
    async fn deliver_reports_sink_failure() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        let emitter = AlertEmitter::new(Arc::new(store.clone()));
        let user_id = UserId::new();

        let err = emitter.deliver(alert(user_id)).await.unwrap_err();
        assert!(err.is_retryable());

        store.set_unavailable(false);
        emitter.deliver(alert(user_id)).await.unwrap();
        assert_eq!(store.alert_count_for_user(&user_id).await, 1);
    }
}
