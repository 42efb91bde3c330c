//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Session Ports
//!
//! - `SessionStore` - Token to session record persistence
//! - `TokenCodec` - Signed token encode/verify
//! - `CredentialVerifier` - Opaque password hashing
//! - `UserRepository` - Account persistence
//!
//! ## Billing Ports
//!
//! - `EntitlementStore` - Transactional subscription/user status writes
//! - `AlertSink` - Append-only user alerts
//! - `IntegrationRepository` - Third-party integrations
//! - `WebhookEventRepository` - Billing event idempotency tracking
//!
//! ## Infrastructure
//!
//! - `Clock` - Injected time source

mod alert_sink;
mod clock;
mod credential_verifier;
mod entitlement_store;
mod integration_repository;
mod session_store;
mod token_codec;
mod user_repository;
mod webhook_event_repository;

pub use alert_sink::AlertSink;
pub use clock::{Clock, SystemClock};
pub use credential_verifier::CredentialVerifier;
pub use entitlement_store::{EntitlementStore, SubscriptionTransition};
pub use integration_repository::IntegrationRepository;
pub use session_store::SessionStore;
pub use token_codec::TokenCodec;
pub use user_repository::UserRepository;
pub use webhook_event_repository::{
    ClaimResult, EventDisposition, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
