//! Alert vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Stable alert kinds consumers may switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionCanceled,
    PaymentSucceeded,
    PaymentFailed,
    TrialEnding,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::SubscriptionCreated => "subscription_created",
            AlertKind::SubscriptionUpdated => "subscription_updated",
            AlertKind::SubscriptionCanceled => "subscription_canceled",
            AlertKind::PaymentSucceeded => "payment_succeeded",
            AlertKind::PaymentFailed => "payment_failed",
            AlertKind::TrialEnding => "trial_ending",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscription_created" => Ok(AlertKind::SubscriptionCreated),
            "subscription_updated" => Ok(AlertKind::SubscriptionUpdated),
            "subscription_canceled" => Ok(AlertKind::SubscriptionCanceled),
            "payment_succeeded" => Ok(AlertKind::PaymentSucceeded),
            "payment_failed" => Ok(AlertKind::PaymentFailed),
            "trial_ending" => Ok(AlertKind::TrialEnding),
            other => Err(ValidationError::invalid_format(
                "kind",
                format!("unknown alert kind '{}'", other),
            )),
        }
    }
}

/// Display severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Success,
    Warning,
    Error,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Success => "success",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Error => "error",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(AlertSeverity::Info),
            "success" => Ok(AlertSeverity::Success),
            "warning" => Ok(AlertSeverity::Warning),
            "error" => Ok(AlertSeverity::Error),
            other => Err(ValidationError::invalid_format(
                "severity",
                format!("unknown severity '{}'", other),
            )),
        }
    }
}
