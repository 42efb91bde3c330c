//! Session domain module.
//!
//! - `record` - Session record held by the session store
//! - `claims` - SessionClaims signed into the bearer token

mod claims;
mod record;

pub use claims::SessionClaims;
pub use record::Session;
