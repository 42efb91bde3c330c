//! Billing webhook event envelope.
//!
//! Only fields relevant to reconciliation are captured; the rest of the
//! processor's schema is ignored.

use serde::{Deserialize, Serialize};

use super::ReconcileError;
use crate::domain::foundation::Timestamp;

/// Signed event delivered by the billing processor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BillingEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Event kind string (e.g. "customer.subscription.created").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Event-specific data.
    pub data: BillingEventData,

    #[serde(default)]
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BillingEventData {
    /// The object that triggered the event (polymorphic on event type).
    pub object: serde_json::Value,
}

impl BillingEvent {
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        created: i64,
        object: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            created,
            data: BillingEventData { object },
            livemode: false,
        }
    }

    /// Parses the raw request body.
    pub fn from_slice(payload: &[u8]) -> Result<Self, ReconcileError> {
        serde_json::from_slice(payload).map_err(|e| ReconcileError::ParseError(e.to_string()))
    }

    /// Parse the event type into a known kind.
    pub fn kind(&self) -> BillingEventKind {
        BillingEventKind::from_type(&self.event_type)
    }

    /// Event creation time, used to order events for the same subscription.
    pub fn created_at(&self) -> Result<Timestamp, ReconcileError> {
        Timestamp::from_unix_secs(self.created)
            .ok_or_else(|| ReconcileError::ParseError(format!("invalid created: {}", self.created)))
    }

    /// Deserializes the data object as the specified payload type.
    pub fn object<T: serde::de::DeserializeOwned>(&self) -> Result<T, ReconcileError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| ReconcileError::ParseError(format!("{}: {}", self.event_type, e)))
    }
}

/// Event kinds handled by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillingEventKind {
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    PaymentSucceeded,
    PaymentFailed,
    TrialWillEnd,
    CustomerCreated,
    /// Unknown or unhandled event type.
    Unknown,
}

impl BillingEventKind {
    pub fn from_type(s: &str) -> Self {
        match s {
            "customer.subscription.created" => Self::SubscriptionCreated,
            "customer.subscription.updated" => Self::SubscriptionUpdated,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            "invoice.payment_succeeded" | "invoice.paid" => Self::PaymentSucceeded,
            "invoice.payment_failed" => Self::PaymentFailed,
            "customer.subscription.trial_will_end" => Self::TrialWillEnd,
            "customer.created" => Self::CustomerCreated,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionCreated => "customer.subscription.created",
            Self::SubscriptionUpdated => "customer.subscription.updated",
            Self::SubscriptionDeleted => "customer.subscription.deleted",
            Self::PaymentSucceeded => "invoice.payment_succeeded",
            Self::PaymentFailed => "invoice.payment_failed",
            Self::TrialWillEnd => "customer.subscription.trial_will_end",
            Self::CustomerCreated => "customer.created",
            Self::Unknown => "unknown",
        }
    }
}
