//! HTTP adapter for the signed-in account: entitlement, alerts, integrations.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AlertsParams, AlertsResponse, ConnectIntegrationRequest, IntegrationsResponse, MeResponse,
};
pub use handlers::{connect_integration, get_me, list_alerts, list_integrations};
pub use routes::account_routes;
