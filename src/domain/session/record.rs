//! Server-side session record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// Binds an opaque token to its owner and an absolute expiry.
///
/// A session is valid iff it exists in the store and `now < expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    pub fn new(token: String, user_id: UserId, created_at: Timestamp, ttl_secs: i64) -> Self {
        Self {
            token,
            user_id,
            expires_at: created_at.plus_secs(ttl_secs),
            created_at,
        }
    }

    /// True once `now` has reached the expiry instant.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        *now >= self.expires_at
    }
}
