//! PostgreSQL implementation of AlertSink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{corrupt_row, db_error};
use crate::domain::alert::{Alert, AlertKind, AlertSeverity};
use crate::domain::foundation::{AlertId, DomainError, Timestamp, UserId};
use crate::ports::AlertSink;

pub struct PostgresAlertSink {
    pool: PgPool,
}

impl PostgresAlertSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AlertRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    message: String,
    severity: String,
    data: serde_json::Value,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = DomainError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let kind: AlertKind = row.kind.parse().map_err(|_| corrupt_row("kind", &row.kind))?;
        let severity: AlertSeverity = row
            .severity
            .parse()
            .map_err(|_| corrupt_row("severity", &row.severity))?;

        Ok(Alert {
            id: AlertId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            kind,
            title: row.title,
            message: row.message,
            severity,
            data: row.data,
            is_read: row.is_read,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl AlertSink for PostgresAlertSink {
    async fn append(&self, alert: &Alert) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO alerts (id, user_id, kind, title, message, severity, data, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(alert.id.as_uuid())
        .bind(alert.user_id.as_uuid())
        .bind(alert.kind.as_str())
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(alert.severity.as_str())
        .bind(&alert.data)
        .bind(alert.is_read)
        .bind(alert.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to append alert", e))?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId, limit: u32) -> Result<Vec<Alert>, DomainError> {
        let rows: Vec<AlertRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, kind, title, message, severity, data, is_read, created_at
            FROM alerts
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list alerts", e))?;

        rows.into_iter().map(Alert::try_from).collect()
    }

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE user_id = $1 AND NOT is_read")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count unread alerts", e))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
