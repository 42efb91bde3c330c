//! WebhookEventRepository port - the log of billing events already handled.
//!
//! Processors deliver at least once. A delivery first claims the event id
//! with a `pending` entry, runs the handler, then completes the entry with
//! its disposition. A completed id is acknowledged without touching
//! entitlements or emitting alerts again. Retryable failures release the
//! claim, so a redelivery gets a fresh try. A claim older than its lease is
//! treated as abandoned and may be taken over.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::domain::billing::ReconcileOutcome;
use crate::domain::foundation::{DomainError, Timestamp, ValidationError};

/// How a logged event was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Claimed by a delivery that has not finished yet.
    Pending,
    /// State changed.
    Applied,
    /// Nothing to do: soft miss, stale, or an unhandled kind.
    Ignored,
    /// Permanent failure; redelivery will not help.
    Failed,
}

impl EventDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventDisposition::Pending => "pending",
            EventDisposition::Applied => "applied",
            EventDisposition::Ignored => "ignored",
            EventDisposition::Failed => "failed",
        }
    }
}

impl fmt::Display for EventDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventDisposition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EventDisposition::Pending),
            "applied" => Ok(EventDisposition::Applied),
            "ignored" => Ok(EventDisposition::Ignored),
            "failed" => Ok(EventDisposition::Failed),
            other => Err(ValidationError::invalid_format(
                "disposition",
                format!("unknown disposition '{}'", other),
            )),
        }
    }
}

/// One entry in the processed-event log.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    pub event_id: String,
    /// Wire type, e.g. `customer.subscription.updated`.
    pub event_type: String,
    pub disposition: EventDisposition,
    /// Why an event was ignored or how it failed.
    pub detail: Option<String>,
    /// Envelope as received, for auditing.
    pub payload: serde_json::Value,
    pub processed_at: Timestamp,
}

impl WebhookEventRecord {
    /// Builds the claim entry written before the handler runs.
    pub fn pending(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
        claimed_at: Timestamp,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            disposition: EventDisposition::Pending,
            detail: None,
            payload,
            processed_at: claimed_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.disposition == EventDisposition::Pending
    }

    /// Builds the log entry for a handler result.
    pub fn from_outcome(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        outcome: Result<&ReconcileOutcome, String>,
        payload: serde_json::Value,
        processed_at: Timestamp,
    ) -> Self {
        let (disposition, detail) = match outcome {
            Ok(ReconcileOutcome::Applied) => (EventDisposition::Applied, None),
            Ok(other) => (EventDisposition::Ignored, Some(other.to_string())),
            Err(error) => (EventDisposition::Failed, Some(error)),
        };
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            disposition,
            detail,
            payload,
            processed_at,
        }
    }
}

/// Result of claiming an event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// This delivery owns the event and must complete or release it.
    Acquired,
    /// The event already has a final disposition.
    Completed,
    /// Another delivery holds a live claim.
    InFlight,
}

/// Processed billing event log, unique by event id.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Inserts a pending claim. An existing pending entry whose
    /// `processed_at` is before `stale_before` is taken over; any other
    /// existing entry wins.
    async fn claim(
        &self,
        claim: WebhookEventRecord,
        stale_before: Timestamp,
    ) -> Result<ClaimResult, DomainError>;

    /// Replaces this delivery's pending claim with its final disposition.
    async fn complete(&self, record: WebhookEventRecord) -> Result<(), DomainError>;

    /// Drops a pending claim so a redelivery can run the handler again.
    /// Completed entries are never removed.
    async fn release(&self, event_id: &str) -> Result<(), DomainError>;
}

/// What the intake reports back to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookResult {
    Processed(ReconcileOutcome),
    AlreadyProcessed,
}

impl WebhookResult {
    /// Short name used in the HTTP acknowledgement.
    pub fn outcome_name(&self) -> &'static str {
        match self {
            WebhookResult::Processed(outcome) => outcome.as_str(),
            WebhookResult::AlreadyProcessed => "duplicate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: Result<&ReconcileOutcome, String>) -> WebhookEventRecord {
        WebhookEventRecord::from_outcome(
            "evt_1",
            "customer.subscription.updated",
            outcome,
            serde_json::json!({}),
            Timestamp::now(),
        )
    }

    #[test]
    fn applied_outcome_has_no_detail() {
        let record = record(Ok(&ReconcileOutcome::Applied));
        assert_eq!(record.disposition, EventDisposition::Applied);
        assert!(record.detail.is_none());
    }

    #[test]
    fn skipped_outcomes_are_ignored_with_reason() {
        let outcome = ReconcileOutcome::soft_miss("no user for customer");
        let record = record(Ok(&outcome));
        assert_eq!(record.disposition, EventDisposition::Ignored);
        assert_eq!(record.detail, Some(outcome.to_string()));
    }

    #[test]
    fn errors_are_failed_with_message() {
        let record = record(Err("Missing field: customer".to_string()));
        assert_eq!(record.disposition, EventDisposition::Failed);
        assert_eq!(record.detail.as_deref(), Some("Missing field: customer"));
    }

    #[test]
    fn disposition_parses_its_own_names() {
        for d in [
            EventDisposition::Pending,
            EventDisposition::Applied,
            EventDisposition::Ignored,
            EventDisposition::Failed,
        ] {
            assert_eq!(d.as_str().parse::<EventDisposition>().unwrap(), d);
        }
        assert!("success".parse::<EventDisposition>().is_err());
    }

    #[test]
    fn pending_claim_has_no_detail() {
        let claim = WebhookEventRecord::pending(
            "evt_1",
            "invoice.payment_failed",
            serde_json::json!({}),
            Timestamp::now(),
        );
        assert!(claim.is_pending());
        assert!(claim.detail.is_none());
        assert!(!record(Ok(&ReconcileOutcome::Applied)).is_pending());
    }

    #[test]
    fn acknowledgement_names() {
        assert_eq!(
            WebhookResult::Processed(ReconcileOutcome::Applied).outcome_name(),
            "applied"
        );
        assert_eq!(WebhookResult::AlreadyProcessed.outcome_name(), "duplicate");
    }
}
