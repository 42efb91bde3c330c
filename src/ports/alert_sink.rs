//! Alert sink port.
//!
//! Append-only writes from reconciliation plus the reads the presentation
//! layer needs.

use async_trait::async_trait;

use crate::domain::alert::Alert;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn append(&self, alert: &Alert) -> Result<(), DomainError>;

    /// Newest first, at most `limit` records.
    async fn list_for_user(&self, user_id: &UserId, limit: u32) -> Result<Vec<Alert>, DomainError>;

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_sink_is_object_safe() {
        fn _accepts_dyn(_sink: &dyn AlertSink) {}
    }
}
