//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresUserRepository` - Accounts and billing customer binding
//! - `PostgresSessionStore` - Session records keyed by token
//! - `PostgresEntitlementStore` - Transactional subscription/user writes
//! - `PostgresAlertSink` - Append-only alerts
//! - `PostgresIntegrationRepository` - Third-party integrations
//! - `PostgresWebhookEventRepository` - Processed billing event log
//!
//! ## Error Mapping
//!
//! Transient failures map to `DatabaseError`, which callers treat as
//! retryable: pool exhaustion and I/O, statement or lock timeouts,
//! serialization conflicts, server shutdown and connection exceptions.
//! Everything else maps to `InternalError`.

mod alert_sink;
mod entitlement_store;
mod integration_repository;
mod session_store;
mod user_repository;
mod webhook_event_repository;

pub use alert_sink::PostgresAlertSink;
pub use entitlement_store::PostgresEntitlementStore;
pub use integration_repository::PostgresIntegrationRepository;
pub use session_store::PostgresSessionStore;
pub use user_repository::PostgresUserRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Opens the connection pool.
///
/// Every new connection gets the configured `statement_timeout`, so a stuck
/// query surfaces as a retryable error instead of holding a row lock.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let statement_timeout = format!("SET statement_timeout = {}", config.statement_timeout_ms);

    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .after_connect(move |conn, _meta| {
            let statement_timeout = statement_timeout.clone();
            Box::pin(async move {
                sqlx::query(&statement_timeout).execute(conn).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

/// Applies pending migrations from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

// SQLSTATE codes worth retrying.
const QUERY_CANCELED: &str = "57014";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const ADMIN_SHUTDOWN: &str = "57P01";
const CRASH_SHUTDOWN: &str = "57P02";
const CANNOT_CONNECT_NOW: &str = "57P03";
const TOO_MANY_CONNECTIONS: &str = "53300";
/// Class 08: connection exceptions.
const CONNECTION_EXCEPTION_CLASS: &str = "08";

/// True for SQLSTATEs where the same statement may succeed on retry.
fn is_retryable_sqlstate(code: &str) -> bool {
    matches!(
        code,
        QUERY_CANCELED
            | SERIALIZATION_FAILURE
            | DEADLOCK_DETECTED
            | LOCK_NOT_AVAILABLE
            | ADMIN_SHUTDOWN
            | CRASH_SHUTDOWN
            | CANNOT_CONNECT_NOW
            | TOO_MANY_CONNECTIONS
    ) || code.starts_with(CONNECTION_EXCEPTION_CLASS)
}

/// Maps a sqlx error onto a domain error, keeping the retryable split.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    let retryable = match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| is_retryable_sqlstate(&code)),
        _ => false,
    };

    let code = if retryable {
        ErrorCode::DatabaseError
    } else {
        ErrorCode::InternalError
    };
    DomainError::new(code, format!("{}: {}", context, err))
}

/// True when `err` is a unique violation on `constraint`.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Error for a stored value the domain does not recognise.
pub(crate) fn corrupt_row(field: &str, value: &str) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!("Invalid {} value in database: {}", field, value),
    )
}
