//! Billing processor subscription status vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription status as reported by the billing processor.
///
/// Unrecognised values are preserved verbatim in `Other` so a processor
/// addition never fails an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingStatus {
    Incomplete,
    IncompleteExpired,
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
    Paused,
    Other(String),
}

impl BillingStatus {
    /// Parses a processor status string. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "incomplete" => BillingStatus::Incomplete,
            "incomplete_expired" => BillingStatus::IncompleteExpired,
            "trialing" => BillingStatus::Trialing,
            "active" => BillingStatus::Active,
            "past_due" => BillingStatus::PastDue,
            "canceled" | "cancelled" => BillingStatus::Canceled,
            "unpaid" => BillingStatus::Unpaid,
            "paused" => BillingStatus::Paused,
            other => BillingStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BillingStatus::Incomplete => "incomplete",
            BillingStatus::IncompleteExpired => "incomplete_expired",
            BillingStatus::Trialing => "trialing",
            BillingStatus::Active => "active",
            BillingStatus::PastDue => "past_due",
            BillingStatus::Canceled => "canceled",
            BillingStatus::Unpaid => "unpaid",
            BillingStatus::Paused => "paused",
            BillingStatus::Other(s) => s,
        }
    }

    /// Statuses that count toward entitlement: trialing, active, past_due.
    pub fn is_active_like(&self) -> bool {
        matches!(
            self,
            BillingStatus::Trialing | BillingStatus::Active | BillingStatus::PastDue
        )
    }

    /// Strings for every active-like status, for use in SQL filters.
    pub const ACTIVE_LIKE: [&'static str; 3] = ["trialing", "active", "past_due"];
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for BillingStatus {
    fn from(s: String) -> Self {
        BillingStatus::parse(&s)
    }
}

impl From<BillingStatus> for String {
    fn from(status: BillingStatus) -> Self {
        status.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses() {
        assert_eq!(BillingStatus::parse("trialing"), BillingStatus::Trialing);
        assert_eq!(BillingStatus::parse("past_due"), BillingStatus::PastDue);
        assert_eq!(BillingStatus::parse("incomplete_expired"), BillingStatus::IncompleteExpired);
        assert_eq!(BillingStatus::parse("cancelled"), BillingStatus::Canceled);
    }

    #[test]
    fn preserves_unknown_statuses() {
        let status = BillingStatus::parse("on_hold");
        assert_eq!(status, BillingStatus::Other("on_hold".into()));
        assert_eq!(status.as_str(), "on_hold");
    }

    #[test]
    fn only_trialing_active_and_past_due_are_active_like() {
        assert!(BillingStatus::Trialing.is_active_like());
        assert!(BillingStatus::Active.is_active_like());
        assert!(BillingStatus::PastDue.is_active_like());
        assert!(!BillingStatus::Canceled.is_active_like());
        assert!(!BillingStatus::Unpaid.is_active_like());
        assert!(!BillingStatus::Incomplete.is_active_like());
        assert!(!BillingStatus::Other("x".into()).is_active_like());
    }

    #[test]
    fn active_like_strings_match_predicate() {
        for s in BillingStatus::ACTIVE_LIKE {
            assert!(BillingStatus::parse(s).is_active_like());
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&BillingStatus::PastDue).unwrap();
        assert_eq!(json, "\"past_due\"");
        let back: BillingStatus = serde_json::from_str("\"weird\"").unwrap();
        assert_eq!(back, BillingStatus::Other("weird".into()));
    }
}
