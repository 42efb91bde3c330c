//! Third-party integrations owned by the signed-in user.

mod manage_integrations;

pub use manage_integrations::{ConnectIntegrationCommand, IntegrationHandler};
