//! PostgreSQL implementation of WebhookEventRepository.
//!
//! The primary key on `event_id` settles concurrent deliveries of the same
//! event. A claim is one `INSERT ... ON CONFLICT DO UPDATE` whose `WHERE`
//! only lets it overwrite a pending row older than the lease, so exactly
//! one delivery gets a row back from `RETURNING`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{corrupt_row, db_error};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{
    ClaimResult, EventDisposition, WebhookEventRecord, WebhookEventRepository,
};

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    disposition: String,
    detail: Option<String>,
    payload: serde_json::Value,
    processed_at: DateTime<Utc>,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        let disposition: EventDisposition = row
            .disposition
            .parse()
            .map_err(|_| corrupt_row("disposition", &row.disposition))?;

        Ok(WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            disposition,
            detail: row.detail,
            payload: row.payload,
            processed_at: Timestamp::from_datetime(row.processed_at),
        })
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, disposition, detail, payload, processed_at
            FROM processed_webhook_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find webhook event", e))?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn claim(
        &self,
        claim: WebhookEventRecord,
        stale_before: Timestamp,
    ) -> Result<ClaimResult, DomainError> {
        let acquired: Option<(String,)> = sqlx::query_as(
            r#"
            INSERT INTO processed_webhook_events
                (event_id, event_type, disposition, detail, payload, processed_at)
            VALUES ($1, $2, 'pending', NULL, $3, $4)
            ON CONFLICT (event_id) DO UPDATE SET
                event_type = EXCLUDED.event_type,
                payload = EXCLUDED.payload,
                processed_at = EXCLUDED.processed_at
            WHERE processed_webhook_events.disposition = 'pending'
              AND processed_webhook_events.processed_at < $5
            RETURNING event_id
            "#,
        )
        .bind(&claim.event_id)
        .bind(&claim.event_type)
        .bind(&claim.payload)
        .bind(claim.processed_at.as_datetime())
        .bind(stale_before.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to claim webhook event", e))?;

        if acquired.is_some() {
            return Ok(ClaimResult::Acquired);
        }

        // Lost to an existing row. A row released since then also reads as
        // in flight; the redelivery will claim it.
        let held = self.find_by_event_id(&claim.event_id).await?;
        Ok(match held {
            Some(record) if !record.is_pending() => ClaimResult::Completed,
            _ => ClaimResult::InFlight,
        })
    }

    async fn complete(&self, record: WebhookEventRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO processed_webhook_events
                (event_id, event_type, disposition, detail, payload, processed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (event_id) DO UPDATE SET
                disposition = EXCLUDED.disposition,
                detail = EXCLUDED.detail,
                payload = EXCLUDED.payload,
                processed_at = EXCLUDED.processed_at
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.disposition.as_str())
        .bind(&record.detail)
        .bind(&record.payload)
        .bind(record.processed_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record webhook event", e))?;

        Ok(())
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            DELETE FROM processed_webhook_events
            WHERE event_id = $1 AND disposition = 'pending'
            "#,
        )
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to release webhook event claim", e))?;

        Ok(())
    }
}
