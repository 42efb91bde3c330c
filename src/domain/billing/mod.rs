//! Billing domain module.
//!
//! Inbound billing processor events: envelope parsing, signature
//! verification, error taxonomy and idempotent processing.
//!
//! # Module Structure
//!
//! - `event` - BillingEvent envelope and BillingEventKind
//! - `payloads` - Typed `data.object` views
//! - `verifier` - HMAC-SHA256 signature verification
//! - `errors` - ReconcileError with retry/status semantics
//! - `outcome` - ReconcileOutcome for acknowledged events
//! - `processor` - Event-id deduplication around the handler

mod errors;
mod event;
mod outcome;
mod payloads;
mod processor;
mod verifier;

pub use errors::ReconcileError;
pub use event::{BillingEvent, BillingEventData, BillingEventKind};
pub use outcome::ReconcileOutcome;
pub use payloads::{CustomerObject, InvoiceObject, SubscriptionObject};
pub use processor::{BillingEventHandler, IdempotentWebhookProcessor, CLAIM_LEASE_SECS};
pub use verifier::{signature_header, SignatureHeader, WebhookVerifier, DEFAULT_TOLERANCE_SECS};
