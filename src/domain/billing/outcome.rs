//! Non-error results of reconciling one billing event.

use std::fmt;

/// What reconciliation did with an event.
///
/// Every variant is acknowledged to the billing processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// State transition and side effects were applied.
    Applied,
    /// Precondition not met (no user, no matching row); nothing changed.
    SoftMiss(String),
    /// Event kind is not handled.
    Ignored(String),
    /// Event predates the last one applied to the row; nothing changed.
    Stale,
}

impl ReconcileOutcome {
    pub fn soft_miss(reason: impl Into<String>) -> Self {
        ReconcileOutcome::SoftMiss(reason.into())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Applied => "applied",
            ReconcileOutcome::SoftMiss(_) => "soft_miss",
            ReconcileOutcome::Ignored(_) => "ignored",
            ReconcileOutcome::Stale => "stale",
        }
    }

    /// Reason text, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ReconcileOutcome::SoftMiss(r) | ReconcileOutcome::Ignored(r) => Some(r),
            ReconcileOutcome::Applied => None,
            ReconcileOutcome::Stale => Some("event older than last applied event"),
        }
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {}", self.as_str(), reason),
            None => f.write_str(self.as_str()),
        }
    }
}
