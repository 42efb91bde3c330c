//! WebhookIntake - Entry point for raw billing webhook deliveries.
//!
//! Verifies the signature (when a secret is configured), parses the
//! envelope and hands the event to the idempotent processor.
//!
//! Without a secret the intake runs in development mode: bodies are parsed
//! unverified and every delivery logs a warning.

use secrecy::SecretString;
use std::sync::Arc;

use crate::domain::billing::{
    BillingEvent, IdempotentWebhookProcessor, ReconcileError, WebhookVerifier,
    DEFAULT_TOLERANCE_SECS,
};
use crate::ports::{Clock, WebhookResult};

/// Signature settings for the intake.
#[derive(Debug, Clone)]
pub struct WebhookIntakeConfig {
    /// Shared signing secret. `None` selects development mode.
    pub webhook_secret: Option<SecretString>,
    pub tolerance_secs: i64,
}

impl Default for WebhookIntakeConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }
}

pub struct WebhookIntake {
    verifier: Option<WebhookVerifier>,
    processor: Arc<IdempotentWebhookProcessor>,
    clock: Arc<dyn Clock>,
}

impl WebhookIntake {
    pub fn new(
        config: WebhookIntakeConfig,
        processor: Arc<IdempotentWebhookProcessor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let verifier = config
            .webhook_secret
            .map(|secret| WebhookVerifier::new(secret, config.tolerance_secs));

        if verifier.is_none() {
            tracing::warn!(
                "Billing webhook secret not configured: signature verification is DISABLED (development mode)"
            );
        }

        Self {
            verifier,
            processor,
            clock,
        }
    }

    pub fn is_development_mode(&self) -> bool {
        self.verifier.is_none()
    }

    /// Verify, parse and process one delivery.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - A secret is configured and no header was sent
    /// - `InvalidSignature` / `TimestampOutOfRange` / `InvalidTimestamp` -
    ///   Verification failed
    /// - `ParseError` - Header or body malformed
    /// - `Database` - Storage unavailable (retryable)
    pub async fn receive(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookResult, ReconcileError> {
        match &self.verifier {
            Some(verifier) => {
                let header = signature.ok_or(ReconcileError::MissingSignature)?;
                verifier.verify_at(body, header, self.clock.now())?;
            }
            None => {
                tracing::warn!("Processing unverified billing webhook (development mode)");
            }
        }

        let event = BillingEvent::from_slice(body)?;
        let event_id = event.id.clone();
        let event_type = event.event_type.clone();

        match self.processor.process(event).await {
            Ok(result) => {
                tracing::info!(
                    event_id = %event_id,
                    event_type = %event_type,
                    outcome = result.outcome_name(),
                    "Billing webhook processed"
                );
                Ok(result)
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        event_id = %event_id,
                        event_type = %event_type,
                        error = %e,
                        "Billing webhook failed; awaiting redelivery"
                    );
                } else {
                    tracing::warn!(
                        event_id = %event_id,
                        event_type = %event_type,
                        error = %e,
                        "Billing webhook rejected"
                    );
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStore, ManualClock};
    use crate::application::handlers::alerts::AlertEmitter;
    use crate::application::handlers::billing::BillingEventReconciler;
    use crate::domain::billing::{signature_header, ReconcileOutcome};
    use serde_json::json;

    const SECRET: &str = "whsec_intake_test";
    const NOW: i64 = 1_704_067_200;

    fn intake(secret: Option<&str>) -> WebhookIntake {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::at_unix(NOW));
        let reconciler = Arc::new(BillingEventReconciler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(AlertEmitter::new(Arc::new(store.clone()))),
            clock.clone(),
        ));
        let processor = Arc::new(IdempotentWebhookProcessor::new(
            Arc::new(store),
            reconciler,
            clock.clone(),
        ));
        let config = WebhookIntakeConfig {
            webhook_secret: secret.map(|s| SecretString::new(s.to_string())),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        };
        WebhookIntake::new(config, processor, clock)
    }

    fn body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "invoice.created",
            "created": NOW,
            "data": { "object": {} }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn development_mode_accepts_unsigned_body() {
        let intake = intake(None);
        assert!(intake.is_development_mode());

        let result = intake.receive(&body(), None).await.unwrap();
        assert!(matches!(
            result,
            WebhookResult::Processed(ReconcileOutcome::Ignored(_))
        ));
    }

    #[tokio::test]
    async fn signed_mode_rejects_missing_header() {
        let intake = intake(Some(SECRET));
        let err = intake.receive(&body(), None).await.unwrap_err();
        assert_eq!(err, ReconcileError::MissingSignature);
    }

    #[tokio::test]
    async fn signed_mode_rejects_wrong_secret() {
        let intake = intake(Some(SECRET));
        let header = signature_header("whsec_other", NOW, &body());
        let err = intake.receive(&body(), Some(&header)).await.unwrap_err();
        assert_eq!(err, ReconcileError::InvalidSignature);
    }

    #[tokio::test]
    async fn signed_mode_rejects_old_timestamp() {
        let intake = intake(Some(SECRET));
        let header = signature_header(SECRET, NOW - 301, &body());
        let err = intake.receive(&body(), Some(&header)).await.unwrap_err();
        assert_eq!(err, ReconcileError::TimestampOutOfRange);
    }

    #[tokio::test]
    async fn signed_delivery_is_processed_once() {
        let intake = intake(Some(SECRET));
        let header = signature_header(SECRET, NOW, &body());

        let first = intake.receive(&body(), Some(&header)).await.unwrap();
        let second = intake.receive(&body(), Some(&header)).await.unwrap();

        assert_eq!(first.outcome_name(), "ignored");
        assert_eq!(second, WebhookResult::AlreadyProcessed);
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let intake = intake(None);
        let err = intake.receive(b"{not json", None).await.unwrap_err();
        assert!(matches!(err, ReconcileError::ParseError(_)));
    }
}
