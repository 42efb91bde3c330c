//! Subscription domain module.
//!
//! Holds the entitlement state derived from billing events.
//!
//! # Module Structure
//!
//! - `aggregate` - Subscription entity and stale-event rules
//! - `status` - BillingStatus processor vocabulary
//! - `plan` - PlanType entitlement levels

mod aggregate;
mod plan;
mod status;

pub use aggregate::{ApplyResult, Subscription, SubscriptionChange};
pub use plan::PlanType;
pub use status::BillingStatus;
