//! SessionGuard - validates bearer tokens against signed claims and the
//! session store.
//!
//! A token is accepted only if its signature verifies, a session record
//! exists for the literal token, the record has not expired at the clock's
//! `now`, and the record's owner matches the token's subject. Validity is
//! re-checked on every call; nothing is cached.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, DomainError, Timestamp, UserId};
use crate::domain::session::{Session, SessionClaims};
use crate::ports::{Clock, SessionStore, TokenCodec};

/// Session issuance settings.
#[derive(Debug, Clone)]
pub struct SessionGuardConfig {
    pub session_ttl_secs: i64,
    pub token_issuer: String,
}

impl Default for SessionGuardConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 7 * 24 * 60 * 60,
            token_issuer: "saas-core".to_string(),
        }
    }
}

/// A newly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: Timestamp,
}

/// Gate for every authenticated operation.
pub struct SessionGuard {
    sessions: Arc<dyn SessionStore>,
    codec: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
    config: SessionGuardConfig,
}

impl SessionGuard {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        codec: Arc<dyn TokenCodec>,
        clock: Arc<dyn Clock>,
        config: SessionGuardConfig,
    ) -> Self {
        Self {
            sessions,
            codec,
            clock,
            config,
        }
    }

    /// Validates a raw bearer token and returns its owner.
    ///
    /// The only mutation is deleting the record of a token found expired.
    ///
    /// # Errors
    ///
    /// - `MissingToken` - No token, or a blank one
    /// - `InvalidToken` - Bad signature/structure, or subject differs from
    ///   the session owner
    /// - `UnknownSession` - No record for this token (revoked or never issued)
    /// - `ExpiredSession` - Record found with `now >= expires_at`; the record
    ///   has been deleted
    /// - `ServiceUnavailable` - Session store failure
    pub async fn authenticate(&self, raw_token: Option<&str>) -> Result<UserId, AuthError> {
        let token = match raw_token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };

        let claims = self.codec.decode(token)?;
        let claimed_user = claims.user_id().ok_or(AuthError::InvalidToken)?;

        let session = self
            .sessions
            .find(token)
            .await?
            .ok_or(AuthError::UnknownSession)?;

        let now = self.clock.now();
        if session.is_expired_at(&now) {
            self.sessions.delete(token).await?;
            tracing::debug!(user_id = %session.user_id, "Expired session removed on access");
            return Err(AuthError::ExpiredSession);
        }

        if session.user_id != claimed_user {
            tracing::warn!(
                token_user = %claimed_user,
                session_user = %session.user_id,
                "Token subject does not match session owner"
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(session.user_id)
    }

    /// Issues a signed token and stores its session record.
    pub async fn issue(&self, user_id: UserId) -> Result<IssuedSession, DomainError> {
        let now = self.clock.now();
        let claims = SessionClaims::new(
            &user_id,
            now,
            self.config.session_ttl_secs,
            &self.config.token_issuer,
        );
        let token = self.codec.encode(&claims)?;

        let session = Session::new(token.clone(), user_id, now, self.config.session_ttl_secs);
        self.sessions.insert(&session).await?;

        Ok(IssuedSession {
            token,
            user_id,
            expires_at: session.expires_at,
        })
    }

    /// Revokes a session. Idempotent: returns `false` if it was already gone.
    pub async fn revoke(&self, token: &str) -> Result<bool, DomainError> {
        self.sessions.delete(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::JwtTokenCodec;
    use crate::adapters::memory::{InMemoryStore, ManualClock};
    use secrecy::SecretString;

    const SECRET: &str = "test-session-secret-at-least-32-bytes!!";
    const START: i64 = 1_704_067_200;

    struct Fixture {
        guard: SessionGuard,
        store: InMemoryStore,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::at_unix(START));
        let config = SessionGuardConfig {
            session_ttl_secs: 3600,
            token_issuer: "test".to_string(),
        };
        let codec = Arc::new(JwtTokenCodec::new(SecretString::new(SECRET.into()), "test"));
        let guard = SessionGuard::new(Arc::new(store.clone()), codec, clock.clone(), config);
        Fixture { guard, store, clock }
    }

    // ══════════════════════════════════════════════════════════════
    // Happy path
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn issued_token_authenticates_within_window() {
        let f = fixture();
        let user_id = UserId::new();
        let issued = f.guard.issue(user_id).await.unwrap();

        f.clock.advance_secs(3599);
        assert_eq!(f.guard.authenticate(Some(&issued.token)).await, Ok(user_id));
    }

    #[tokio::test]
    async fn issued_session_expires_after_ttl() {
        let f = fixture();
        let issued = f.guard.issue(UserId::new()).await.unwrap();
        assert_eq!(issued.expires_at.as_unix_secs(), START + 3600);
    }

    // ══════════════════════════════════════════════════════════════
    // Rejections
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_or_blank_token_is_rejected() {
        let f = fixture();
        assert_eq!(f.guard.authenticate(None).await, Err(AuthError::MissingToken));
        assert_eq!(f.guard.authenticate(Some("  ")).await, Err(AuthError::MissingToken));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let f = fixture();
        assert_eq!(
            f.guard.authenticate(Some("not.a.jwt")).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn revoked_token_is_unknown() {
        let f = fixture();
        let issued = f.guard.issue(UserId::new()).await.unwrap();

        assert!(f.guard.revoke(&issued.token).await.unwrap());
        assert!(!f.guard.revoke(&issued.token).await.unwrap());

        assert_eq!(
            f.guard.authenticate(Some(&issued.token)).await,
            Err(AuthError::UnknownSession)
        );
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_deleted() {
        let f = fixture();
        let issued = f.guard.issue(UserId::new()).await.unwrap();

        f.clock.advance_secs(3600);
        assert_eq!(
            f.guard.authenticate(Some(&issued.token)).await,
            Err(AuthError::ExpiredSession)
        );
        assert!(f.store.find(&issued.token).await.unwrap().is_none());

        // Next access finds nothing.
        assert_eq!(
            f.guard.authenticate(Some(&issued.token)).await,
            Err(AuthError::UnknownSession)
        );
    }

    #[tokio::test]
    async fn token_for_other_user_than_session_is_invalid() {
        let f = fixture();
        let issued = f.guard.issue(UserId::new()).await.unwrap();

        // Re-point the stored record at another user.
        let mut session = f.store.find(&issued.token).await.unwrap().unwrap();
        f.store.delete(&issued.token).await.unwrap();
        session.user_id = UserId::new();
        f.store.insert(&session).await.unwrap();

        assert_eq!(
            f.guard.authenticate(Some(&issued.token)).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let f = fixture();
        let issued = f.guard.issue(UserId::new()).await.unwrap();
        f.store.set_unavailable(true);

        let err = f.guard.authenticate(Some(&issued.token)).await.unwrap_err();
        assert!(err.is_transient());
    }
}
