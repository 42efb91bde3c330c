//! Response bodies for account endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::alerts::ListAlertsResult;
use crate::application::handlers::entitlement::EntitlementView;
use crate::domain::alert::Alert;
use crate::domain::foundation::UserId;
use crate::domain::integration::Integration;
use crate::domain::subscription::PlanType;
use crate::domain::user::AccountStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: UserId,
    pub account_status: AccountStatus,
    pub plan: PlanType,
}

impl From<EntitlementView> for MeResponse {
    fn from(view: EntitlementView) -> Self {
        Self {
            user_id: view.user_id,
            account_status: view.account_status,
            plan: view.plan,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub unread: u64,
}

impl From<ListAlertsResult> for AlertsResponse {
    fn from(result: ListAlertsResult) -> Self {
        Self {
            alerts: result.alerts,
            unread: result.unread,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectIntegrationRequest {
    pub provider: String,
    pub name: String,
    #[serde(default)]
    pub is_premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationsResponse {
    pub integrations: Vec<Integration>,
}
