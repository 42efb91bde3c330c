//! User-facing alert records and the texts emitted for billing events.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{AlertKind, AlertSeverity};
use crate::domain::foundation::{AlertId, Timestamp, UserId};
use crate::domain::subscription::{BillingStatus, PlanType, SubscriptionChange};

/// Append-only notification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub user_id: UserId,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub data: Value,
    pub is_read: bool,
    pub created_at: Timestamp,
}

impl Alert {
    pub fn new(
        user_id: UserId,
        kind: AlertKind,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        data: Value,
        now: Timestamp,
    ) -> Self {
        Self {
            id: AlertId::new(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            severity,
            data,
            is_read: false,
            created_at: now,
        }
    }

    /// Welcome alert for a newly created subscription.
    pub fn subscription_created(
        user_id: UserId,
        plan: PlanType,
        status: &BillingStatus,
        billing_subscription_id: &str,
        now: Timestamp,
    ) -> Self {
        let message = if *status == BillingStatus::Trialing {
            format!("Your {} trial has started.", plan.display_name())
        } else {
            format!("Your {} subscription is now {}.", plan.display_name(), status)
        };

        Self::new(
            user_id,
            AlertKind::SubscriptionCreated,
            AlertSeverity::Success,
            format!("Welcome to {}!", plan.display_name()),
            message,
            json!({
                "subscription_id": billing_subscription_id,
                "plan": plan,
                "status": status,
            }),
            now,
        )
    }

    /// Alert for a subscription update, worded by what changed.
    ///
    /// A newly scheduled cancellation wins over a reactivation.
    pub fn subscription_updated(
        user_id: UserId,
        previous_status: &BillingStatus,
        previous_cancel_at_period_end: bool,
        change: &SubscriptionChange,
        now: Timestamp,
    ) -> Self {
        let (severity, title, message) =
            if change.cancel_at_period_end && !previous_cancel_at_period_end {
                let until = change
                    .current_period_end
                    .map(|end| format!(" Access continues until {}.", end.date_string()))
                    .unwrap_or_default();
                (
                    AlertSeverity::Warning,
                    "Subscription set to cancel",
                    format!(
                        "Your {} subscription will cancel at the end of the billing period.{}",
                        change.plan_type.display_name(),
                        until
                    ),
                )
            } else if change.status == BillingStatus::Active && *previous_status != BillingStatus::Active {
                (
                    AlertSeverity::Success,
                    "Subscription reactivated",
                    format!(
                        "Your {} subscription is active again.",
                        change.plan_type.display_name()
                    ),
                )
            } else {
                (
                    AlertSeverity::Info,
                    "Subscription updated",
                    format!(
                        "Your {} subscription is now {}.",
                        change.plan_type.display_name(),
                        change.status
                    ),
                )
            };

        Self::new(
            user_id,
            AlertKind::SubscriptionUpdated,
            severity,
            title,
            message,
            json!({
                "subscription_id": change.billing_subscription_id,
                "plan": change.plan_type,
                "status": change.status,
                "cancel_at_period_end": change.cancel_at_period_end,
            }),
            now,
        )
    }

    pub fn subscription_canceled(
        user_id: UserId,
        plan: PlanType,
        billing_subscription_id: &str,
        now: Timestamp,
    ) -> Self {
        Self::new(
            user_id,
            AlertKind::SubscriptionCanceled,
            AlertSeverity::Warning,
            "Subscription canceled",
            format!(
                "Your {} subscription has been canceled. Premium integrations were deactivated.",
                plan.display_name()
            ),
            json!({ "subscription_id": billing_subscription_id, "plan": plan }),
            now,
        )
    }

    pub fn payment_succeeded(user_id: UserId, amount_minor: i64, currency: &str, now: Timestamp) -> Self {
        let amount = format_amount(amount_minor, currency);
        Self::new(
            user_id,
            AlertKind::PaymentSucceeded,
            AlertSeverity::Success,
            "Payment received",
            format!("We received your payment of {}.", amount),
            json!({ "amount": amount_minor, "currency": currency.to_uppercase() }),
            now,
        )
    }

    pub fn payment_failed(user_id: UserId, amount_minor: i64, currency: &str, now: Timestamp) -> Self {
        let amount = format_amount(amount_minor, currency);
        Self::new(
            user_id,
            AlertKind::PaymentFailed,
            AlertSeverity::Error,
            "Payment failed",
            format!(
                "Your payment of {} could not be processed. Please update your payment method.",
                amount
            ),
            json!({ "amount": amount_minor, "currency": currency.to_uppercase() }),
            now,
        )
    }

    pub fn trial_ending(user_id: UserId, trial_end: Timestamp, now: Timestamp) -> Self {
        let date = trial_end.date_string();
        Self::new(
            user_id,
            AlertKind::TrialEnding,
            AlertSeverity::Warning,
            "Trial ending soon",
            format!("Your trial ends on {}. Add a payment method to keep access.", date),
            json!({ "trial_end": date }),
            now,
        )
    }
}

/// Formats a minor-unit amount as `12.34 USD`.
pub fn format_amount(amount_minor: i64, currency: &str) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, currency.to_uppercase())
}
