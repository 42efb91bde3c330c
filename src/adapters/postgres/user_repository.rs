//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{corrupt_row, db_error, is_unique_violation};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::user::{AccountStatus, User};
use crate::ports::UserRepository;

const EMAIL_UNIQUE: &str = "users_email_key";
const BILLING_CUSTOMER_UNIQUE: &str = "users_billing_customer_id_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    display_name: String,
    company_name: Option<String>,
    subscription_status: String,
    billing_customer_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let subscription_status: AccountStatus = row
            .subscription_status
            .parse()
            .map_err(|_| corrupt_row("subscription_status", &row.subscription_status))?;

        Ok(User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            password_hash: row.password_hash,
            display_name: row.display_name,
            company_name: row.company_name,
            subscription_status,
            billing_customer_id: row.billing_customer_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_USER: &str = r#"
    SELECT id, email, password_hash, display_name, company_name,
           subscription_status, billing_customer_id, created_at, updated_at
    FROM users
"#;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, display_name, company_name,
                subscription_status, billing_customer_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(&user.company_name)
        .bind(user.subscription_status.as_str())
        .bind(&user.billing_customer_id)
        .bind(user.created_at.as_datetime())
        .bind(user.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, EMAIL_UNIQUE) {
                DomainError::new(ErrorCode::EmailTaken, "Email is already registered")
            } else {
                db_error("Failed to create user", e)
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user by email", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_billing_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{} WHERE billing_customer_id = $1", SELECT_USER))
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find user by billing customer", e))?;

        row.map(User::try_from).transpose()
    }

    async fn bind_billing_customer(
        &self,
        id: &UserId,
        customer_id: &str,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET billing_customer_id = $2, updated_at = $3
            WHERE id = $1 AND billing_customer_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(customer_id)
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            // Another user already holds this customer reference.
            Err(e) if is_unique_violation(&e, BILLING_CUSTOMER_UNIQUE) => Ok(false),
            Err(e) => Err(db_error("Failed to bind billing customer", e)),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete user", e))?;

        Ok(result.rows_affected() == 1)
    }
}
