//! Signed token body.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{Timestamp, UserId};

/// Claims carried inside a bearer token.
///
/// `sid` is random per issuance so two logins by the same user at the same
/// second still produce distinct tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Owning user id.
    pub sub: String,
    /// Per-session nonce.
    pub sid: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds). Informational; the session record decides.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
}

impl SessionClaims {
    pub fn new(user_id: &UserId, issued_at: Timestamp, ttl_secs: i64, issuer: &str) -> Self {
        Self {
            sub: user_id.to_string(),
            sid: Uuid::new_v4().to_string(),
            iat: issued_at.as_unix_secs(),
            exp: issued_at.plus_secs(ttl_secs).as_unix_secs(),
            iss: issuer.to_string(),
        }
    }

    /// Parses the subject back into a user id.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_user_and_expiry() {
        let user_id = UserId::new();
        let now = Timestamp::from_unix_secs(10_000).unwrap();
        let claims = SessionClaims::new(&user_id, now, 3600, "saas-core");

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.iat, 10_000);
        assert_eq!(claims.exp, 13_600);
        assert_eq!(claims.iss, "saas-core");
    }

    #[test]
    fn each_issuance_gets_a_fresh_sid() {
        let user_id = UserId::new();
        let now = Timestamp::now();
        let a = SessionClaims::new(&user_id, now, 60, "i");
        let b = SessionClaims::new(&user_id, now, 60, "i");
        assert_ne!(a.sid, b.sid);
    }

    #[test]
    fn garbage_subject_yields_no_user() {
        let mut claims = SessionClaims::new(&UserId::new(), Timestamp::now(), 60, "i");
        claims.sub = "not-a-uuid".into();
        assert_eq!(claims.user_id(), None);
    }
}
