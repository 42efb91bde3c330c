//! Typed views of `data.object` for each handled event kind.

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{BillingStatus, PlanType, SubscriptionChange};

/// Plan assumed when an event names none we recognise.
const DEFAULT_PLAN: PlanType = PlanType::Pro;

/// Subscription object carried by `customer.subscription.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: String,
    pub status: BillingStatus,
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub trial_end: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub items: Option<ItemList>,
    #[serde(default)]
    pub plan: Option<PlanRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    #[serde(default)]
    pub price: Option<PriceRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRef {
    #[serde(default)]
    pub lookup_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanRef {
    #[serde(default)]
    pub nickname: Option<String>,
}

impl SubscriptionObject {
    /// Resolves the plan from, in order: `metadata.plan`, the first item's
    /// price lookup key, the legacy plan nickname.
    pub fn plan_type(&self) -> PlanType {
        let first_lookup_key = self
            .items
            .as_ref()
            .and_then(|items| items.data.first())
            .and_then(|item| item.price.as_ref())
            .and_then(|price| price.lookup_key.as_deref());
        let nickname = self.plan.as_ref().and_then(|p| p.nickname.as_deref());

        [self.metadata.get("plan").map(String::as_str), first_lookup_key, nickname]
            .into_iter()
            .flatten()
            .find_map(PlanType::from_label)
            .unwrap_or(DEFAULT_PLAN)
    }

    /// Trial end, or the period end when no trial end is present.
    pub fn trial_end_or_period_end(&self) -> Option<Timestamp> {
        self.trial_end
            .or(self.current_period_end)
            .and_then(Timestamp::from_unix_secs)
    }

    /// The row fields this event asserts, stamped with the event time.
    pub fn to_change(&self, event_at: Timestamp) -> SubscriptionChange {
        SubscriptionChange {
            billing_subscription_id: self.id.clone(),
            status: self.status.clone(),
            plan_type: self.plan_type(),
            current_period_start: self.current_period_start.and_then(Timestamp::from_unix_secs),
            current_period_end: self.current_period_end.and_then(Timestamp::from_unix_secs),
            cancel_at_period_end: self.cancel_at_period_end,
            event_at,
        }
    }
}

/// Invoice object carried by `invoice.*` events. Amounts are minor units.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceObject {
    #[serde(default)]
    pub id: Option<String>,
    pub customer: String,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub subscription: Option<String>,
}

fn default_currency() -> String {
    "usd".to_string()
}

/// Customer object carried by `customer.created`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerObject {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}
