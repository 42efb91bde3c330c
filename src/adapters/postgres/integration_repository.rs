//! PostgreSQL implementation of IntegrationRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use crate::domain::foundation::{DomainError, IntegrationId, Timestamp, UserId};
use crate::domain::integration::Integration;
use crate::ports::IntegrationRepository;

pub struct PostgresIntegrationRepository {
    pool: PgPool,
}

impl PostgresIntegrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct IntegrationRow {
    id: Uuid,
    user_id: Uuid,
    provider: String,
    name: String,
    is_premium: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<IntegrationRow> for Integration {
    fn from(row: IntegrationRow) -> Self {
        Integration {
            id: IntegrationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            provider: row.provider,
            name: row.name,
            is_premium: row.is_premium,
            is_active: row.is_active,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

#[async_trait]
impl IntegrationRepository for PostgresIntegrationRepository {
    async fn save(&self, integration: &Integration) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO integrations (id, user_id, provider, name, is_premium, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                provider = EXCLUDED.provider,
                name = EXCLUDED.name,
                is_premium = EXCLUDED.is_premium,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(integration.id.as_uuid())
        .bind(integration.user_id.as_uuid())
        .bind(&integration.provider)
        .bind(&integration.name)
        .bind(integration.is_premium)
        .bind(integration.is_active)
        .bind(integration.created_at.as_datetime())
        .bind(integration.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save integration", e))?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Integration>, DomainError> {
        let rows: Vec<IntegrationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, provider, name, is_premium, is_active, created_at, updated_at
            FROM integrations
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list integrations", e))?;

        Ok(rows.into_iter().map(Integration::from).collect())
    }
}
