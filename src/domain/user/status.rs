//! User-facing subscription status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;
use crate::domain::subscription::BillingStatus;

/// Account-level subscription status shown to the user.
///
/// Derived from the billing processor's status vocabulary by the
/// reconciler; nothing else writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Free,
    Trialing,
    Active,
    PastDue,
    Canceled,
}

impl AccountStatus {
    /// Maps a billing subscription status onto the account status.
    ///
    /// `unpaid` is still owed money, so it reads as past due. Statuses that
    /// never granted access (incomplete, paused, unknown) read as free.
    pub fn from_billing(status: &BillingStatus) -> Self {
        match status {
            BillingStatus::Trialing => AccountStatus::Trialing,
            BillingStatus::Active => AccountStatus::Active,
            BillingStatus::PastDue | BillingStatus::Unpaid => AccountStatus::PastDue,
            BillingStatus::Canceled => AccountStatus::Canceled,
            BillingStatus::Incomplete
            | BillingStatus::IncompleteExpired
            | BillingStatus::Paused
            | BillingStatus::Other(_) => AccountStatus::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Free => "free",
            AccountStatus::Trialing => "trialing",
            AccountStatus::Active => "active",
            AccountStatus::PastDue => "past_due",
            AccountStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(AccountStatus::Free),
            "trialing" => Ok(AccountStatus::Trialing),
            "active" => Ok(AccountStatus::Active),
            "past_due" => Ok(AccountStatus::PastDue),
            "canceled" => Ok(AccountStatus::Canceled),
            other => Err(ValidationError::invalid_format(
                "subscription_status",
                format!("unknown account status '{}'", other),
            )),
        }
    }
}
