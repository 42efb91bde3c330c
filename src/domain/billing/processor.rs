//! Webhook processor - idempotent billing event handling.
//!
//! Coordinates the processed-events store and the reconciliation handler so
//! each event id is acted on at most once.
//!
//! ## Design
//!
//! 1. Claim the event id with a pending entry (idempotency)
//! 2. Hand the event to the handler
//! 3. Complete the entry with the result (success, ignored, or failed)
//!
//! Retryable failures release the claim, so the processor's redelivery
//! runs the handler again.
//!
//! ## Race Condition Handling
//!
//! When two deliveries of one event arrive together, the first claim wins
//! (PRIMARY KEY on event_id). The other sees a live claim and answers with
//! a retryable `InFlight`, or `AlreadyProcessed` once the winner completed.
//! A claim left pending by a crashed worker is taken over after
//! `CLAIM_LEASE_SECS`.

use async_trait::async_trait;
use std::sync::Arc;

use super::{BillingEvent, ReconcileError, ReconcileOutcome};
use crate::ports::{
    ClaimResult, Clock, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};

/// How long a pending claim blocks other deliveries of the same event.
pub const CLAIM_LEASE_SECS: i64 = 300;

/// Applies one billing event to entitlement state.
#[async_trait]
pub trait BillingEventHandler: Send + Sync {
    async fn handle(&self, event: &BillingEvent) -> Result<ReconcileOutcome, ReconcileError>;
}

/// Processes billing events with idempotency guarantees.
pub struct IdempotentWebhookProcessor {
    repository: Arc<dyn WebhookEventRepository>,
    handler: Arc<dyn BillingEventHandler>,
    clock: Arc<dyn Clock>,
}

impl IdempotentWebhookProcessor {
    pub fn new(
        repository: Arc<dyn WebhookEventRepository>,
        handler: Arc<dyn BillingEventHandler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            handler,
            clock,
        }
    }

    /// Process a billing event at most once.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed(_))` - Event was reconciled now
    /// - `Ok(WebhookResult::AlreadyProcessed)` - Event id seen before
    /// - `Err(ReconcileError::InFlight(_))` - Another delivery holds the claim
    /// - `Err(_)` - Reconciliation failed
    pub async fn process(&self, event: BillingEvent) -> Result<WebhookResult, ReconcileError> {
        let payload = serde_json::to_value(&event)
            .map_err(|e| ReconcileError::ParseError(format!("Failed to serialize event: {}", e)))?;

        let now = self.clock.now();
        let claim = WebhookEventRecord::pending(&event.id, &event.event_type, payload.clone(), now);
        match self
            .repository
            .claim(claim, now.minus_secs(CLAIM_LEASE_SECS))
            .await?
        {
            ClaimResult::Acquired => {}
            ClaimResult::Completed => {
                tracing::debug!(event_id = %event.id, "Duplicate billing event skipped");
                return Ok(WebhookResult::AlreadyProcessed);
            }
            ClaimResult::InFlight => {
                tracing::info!(event_id = %event.id, "Billing event already in flight");
                return Err(ReconcileError::InFlight(event.id.clone()));
            }
        }

        let result = self.handler.handle(&event).await;

        if let Err(e) = &result {
            if e.is_retryable() {
                if let Err(release_err) = self.repository.release(&event.id).await {
                    // The lease still frees the claim eventually.
                    tracing::warn!(
                        event_id = %event.id,
                        error = %release_err,
                        "Failed to release billing event claim"
                    );
                }
                return Err(e.clone());
            }
        }

        let record = WebhookEventRecord::from_outcome(
            &event.id,
            &event.event_type,
            result.as_ref().map_err(|e| e.to_string()),
            payload,
            self.clock.now(),
        );
        self.repository.complete(record).await?;

        result.map(WebhookResult::Processed)
    }
}
