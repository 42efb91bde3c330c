//! PostgreSQL implementation of SessionStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, is_unique_violation};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::session::Session;
use crate::ports::SessionStore;

const SESSION_PK: &str = "sessions_pkey";

pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    token: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            token: row.token,
            user_id: UserId::from_uuid(row.user_id),
            expires_at: Timestamp::from_datetime(row.expires_at),
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn insert(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.token)
        .bind(session.user_id.as_uuid())
        .bind(session.expires_at.as_datetime())
        .bind(session.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, SESSION_PK) {
                DomainError::new(ErrorCode::DuplicateSession, "Session token already exists")
            } else {
                db_error("Failed to insert session", e)
            }
        })?;

        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<Session>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT token, user_id, expires_at, created_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find session", e))?;

        Ok(row.map(Session::from))
    }

    async fn delete(&self, token: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete session", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to sweep sessions", e))?;

        Ok(result.rows_affected())
    }
}
