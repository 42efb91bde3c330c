//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::alerts::{AlertEmitter, ListAlertsHandler, ListAlertsQuery, ListAlertsResult};
pub use handlers::auth::{
    IssuedSession, LoginCommand, LoginError, LoginHandler, RegisterCommand, RegisterHandler,
    RegisterResult, RegistrationError, SessionGuard, SessionGuardConfig, SessionSweeper,
};
pub use handlers::billing::{BillingEventReconciler, WebhookIntake, WebhookIntakeConfig};
pub use handlers::entitlement::{EntitlementQueries, EntitlementView};
