//! User domain module.
//!
//! - `aggregate` - User account entity
//! - `status` - AccountStatus derived from billing state

mod aggregate;
mod status;

pub use aggregate::{normalize_email, User};
pub use status::AccountStatus;
