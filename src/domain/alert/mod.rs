//! Alert domain module.
//!
//! - `aggregate` - Alert record and per-event constructors
//! - `kind` - AlertKind and AlertSeverity vocabularies

mod aggregate;
mod kind;

pub use aggregate::{format_amount, Alert};
pub use kind::{AlertKind, AlertSeverity};
