//! Plan types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entitlement level granted by a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Free,
    Starter,
    Pro,
    Enterprise,
}

impl PlanType {
    /// Recognises a plan from a processor label such as `pro`,
    /// `pro_monthly` or `Starter Plan`.
    pub fn from_label(label: &str) -> Option<Self> {
        label
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .find_map(|word| match word {
                "free" => Some(PlanType::Free),
                "starter" => Some(PlanType::Starter),
                "pro" => Some(PlanType::Pro),
                "enterprise" => Some(PlanType::Enterprise),
                _ => None,
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "free",
            PlanType::Starter => "starter",
            PlanType::Pro => "pro",
            PlanType::Enterprise => "enterprise",
        }
    }

    /// Human-readable name used in alert titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanType::Free => "Free",
            PlanType::Starter => "Starter",
            PlanType::Pro => "Pro",
            PlanType::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
