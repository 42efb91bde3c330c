//! Entitlement read path.

mod get_entitlement;

pub use get_entitlement::{EntitlementQueries, EntitlementView};
