//! Token codec port.
//!
//! Signs session claims into a bearer token and verifies tokens back into
//! claims without touching the session store.
//!
//! # Contract
//!
//! Implementations must:
//! - Validate the signature and issuer
//! - NOT reject on the token's own `exp`; the session record is the
//!   source of truth for expiry
//! - Return `AuthError::InvalidToken` for anything malformed

use crate::domain::foundation::{AuthError, DomainError};
use crate::domain::session::SessionClaims;

pub trait TokenCodec: Send + Sync {
    /// Signs claims into a token string.
    fn encode(&self, claims: &SessionClaims) -> Result<String, DomainError>;

    /// Verifies a token string and returns its claims.
    fn decode(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_codec_is_object_safe() {
        fn _accepts_dyn(_codec: &dyn TokenCodec) {}
    }
}
