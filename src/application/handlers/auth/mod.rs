//! Session handlers.
//!
//! ## Commands
//! - Registering accounts
//! - Logging in
//!
//! ## Services
//! - `SessionGuard` - bearer token validation, issuance and revocation
//! - `SessionSweeper` - periodic expired-session cleanup

mod login;
mod register;
mod session_guard;
mod sweep_sessions;

pub use login::{LoginCommand, LoginError, LoginHandler};
pub use register::{
    RegisterCommand, RegisterHandler, RegisterResult, RegistrationError, MIN_PASSWORD_LEN,
};
pub use session_guard::{IssuedSession, SessionGuard, SessionGuardConfig};
pub use sweep_sessions::SessionSweeper;
