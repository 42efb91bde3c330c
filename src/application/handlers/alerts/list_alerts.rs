//! ListAlertsHandler - Query handler for a user's alert feed.

use std::sync::Arc;

use crate::domain::alert::Alert;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::AlertSink;

/// Largest page a caller may request.
pub const MAX_ALERT_PAGE: u32 = 100;

/// Query to list a user's alerts, newest first.
#[derive(Debug, Clone)]
pub struct ListAlertsQuery {
    pub user_id: UserId,
    pub limit: u32,
}

#[derive(Debug, Clone)]
pub struct ListAlertsResult {
    pub alerts: Vec<Alert>,
    pub unread: u64,
}

pub struct ListAlertsHandler {
    sink: Arc<dyn AlertSink>,
}

impl ListAlertsHandler {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self { sink }
    }

    pub async fn handle(&self, query: ListAlertsQuery) -> Result<ListAlertsResult, DomainError> {
        let limit = query.limit.clamp(1, MAX_ALERT_PAGE);
        let alerts = self.sink.list_for_user(&query.user_id, limit).await?;
        let unread = self.sink.unread_count(&query.user_id).await?;
        Ok(ListAlertsResult { alerts, unread })
    }
}
