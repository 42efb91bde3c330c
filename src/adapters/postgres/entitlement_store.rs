//! PostgreSQL implementation of EntitlementStore.
//!
//! Each write runs in one transaction. The subscription row is locked with
//! `SELECT ... FOR UPDATE` before the stale-event check, so two events for
//! the same billing subscription serialize on that row. The user's
//! `subscription_status` is written in the same transaction.
//!
//! A row that does not exist yet cannot be locked. First inserts race on
//! the `billing_subscription_id` unique key instead: the conditional
//! `ON CONFLICT ... DO UPDATE ... WHERE` keeps the newer event, and a loser
//! whose update is filtered out re-reads the row and reports `Stale`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{corrupt_row, db_error};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{
    ApplyResult, BillingStatus, PlanType, Subscription, SubscriptionChange,
};
use crate::domain::user::AccountStatus;
use crate::ports::{EntitlementStore, SubscriptionTransition};

pub struct PostgresEntitlementStore {
    pool: PgPool,
}

impl PostgresEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    billing_subscription_id: Option<String>,
    status: String,
    plan_type: String,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    last_event_at: DateTime<Utc>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let plan_type = PlanType::from_label(&row.plan_type)
            .ok_or_else(|| corrupt_row("plan_type", &row.plan_type))?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            billing_subscription_id: row.billing_subscription_id,
            status: BillingStatus::parse(&row.status),
            plan_type,
            current_period_start: row.current_period_start.map(Timestamp::from_datetime),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            cancel_at_period_end: row.cancel_at_period_end,
            last_event_at: Timestamp::from_datetime(row.last_event_at),
            version: row.version,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SUBSCRIPTION_COLUMNS: &str = r#"
    id, user_id, billing_subscription_id, status, plan_type,
    current_period_start, current_period_end, cancel_at_period_end,
    last_event_at, version, created_at, updated_at
"#;

async fn begin(pool: &PgPool) -> Result<Transaction<'static, Postgres>, DomainError> {
    pool.begin()
        .await
        .map_err(|e| db_error("Failed to begin transaction", e))
}

async fn commit(tx: Transaction<'static, Postgres>) -> Result<(), DomainError> {
    tx.commit()
        .await
        .map_err(|e| db_error("Failed to commit transaction", e))
}

async fn lock_by_billing_id(
    tx: &mut Transaction<'static, Postgres>,
    billing_subscription_id: &str,
) -> Result<Option<Subscription>, DomainError> {
    let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
        "SELECT {} FROM subscriptions WHERE billing_subscription_id = $1 FOR UPDATE",
        SUBSCRIPTION_COLUMNS
    ))
    .bind(billing_subscription_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to lock subscription", e))?;

    row.map(Subscription::try_from).transpose()
}

async fn write_row(
    tx: &mut Transaction<'static, Postgres>,
    sub: &Subscription,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        UPDATE subscriptions
        SET status = $2,
            plan_type = $3,
            current_period_start = $4,
            current_period_end = $5,
            cancel_at_period_end = $6,
            last_event_at = $7,
            version = $8,
            updated_at = $9
        WHERE id = $1
        "#,
    )
    .bind(sub.id.as_uuid())
    .bind(sub.status.as_str())
    .bind(sub.plan_type.as_str())
    .bind(sub.current_period_start.as_ref().map(Timestamp::as_datetime))
    .bind(sub.current_period_end.as_ref().map(Timestamp::as_datetime))
    .bind(sub.cancel_at_period_end)
    .bind(sub.last_event_at.as_datetime())
    .bind(sub.version)
    .bind(sub.updated_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to update subscription", e))?;

    Ok(())
}

async fn set_account_status(
    tx: &mut Transaction<'static, Postgres>,
    user_id: &UserId,
    status: AccountStatus,
    now: Timestamp,
) -> Result<(), DomainError> {
    sqlx::query("UPDATE users SET subscription_status = $2, updated_at = $3 WHERE id = $1")
        .bind(user_id.as_uuid())
        .bind(status.as_str())
        .bind(now.as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to update account status", e))?;

    Ok(())
}

/// Applies a change to a locked row and persists it unless stale.
async fn apply_locked(
    tx: &mut Transaction<'static, Postgres>,
    mut row: Subscription,
    change: &SubscriptionChange,
    now: Timestamp,
) -> Result<SubscriptionTransition, DomainError> {
    let previous = row.clone();
    let result = row.apply(change, now);

    if result == ApplyResult::Applied {
        write_row(tx, &row).await?;
        let status = AccountStatus::from_billing(&change.status);
        set_account_status(tx, &row.user_id, status, now).await?;
    }

    Ok(SubscriptionTransition {
        previous: Some(previous),
        current: row,
        result,
        integrations_deactivated: 0,
    })
}

#[async_trait]
impl EntitlementStore for PostgresEntitlementStore {
    async fn create_or_update(
        &self,
        user_id: &UserId,
        change: &SubscriptionChange,
        now: Timestamp,
    ) -> Result<SubscriptionTransition, DomainError> {
        let mut tx = begin(&self.pool).await?;

        if let Some(row) = lock_by_billing_id(&mut tx, &change.billing_subscription_id).await? {
            let transition = apply_locked(&mut tx, row, change, now).await?;
            commit(tx).await?;
            return Ok(transition);
        }

        let fresh = Subscription::from_change(*user_id, change, now);
        let inserted: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO subscriptions ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (billing_subscription_id) DO UPDATE SET
                status = EXCLUDED.status,
                plan_type = EXCLUDED.plan_type,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                last_event_at = EXCLUDED.last_event_at,
                version = subscriptions.version + 1,
                updated_at = EXCLUDED.updated_at
            WHERE subscriptions.last_event_at <= EXCLUDED.last_event_at
            RETURNING {cols}
            "#,
            cols = SUBSCRIPTION_COLUMNS
        ))
        .bind(fresh.id.as_uuid())
        .bind(fresh.user_id.as_uuid())
        .bind(&fresh.billing_subscription_id)
        .bind(fresh.status.as_str())
        .bind(fresh.plan_type.as_str())
        .bind(fresh.current_period_start.as_ref().map(Timestamp::as_datetime))
        .bind(fresh.current_period_end.as_ref().map(Timestamp::as_datetime))
        .bind(fresh.cancel_at_period_end)
        .bind(fresh.last_event_at.as_datetime())
        .bind(fresh.version)
        .bind(fresh.created_at.as_datetime())
        .bind(fresh.updated_at.as_datetime())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to upsert subscription", e))?;

        let transition = match inserted {
            Some(row) if row.id == *fresh.id.as_uuid() => SubscriptionTransition {
                previous: None,
                current: Subscription::try_from(row)?,
                result: ApplyResult::Applied,
                integrations_deactivated: 0,
            },
            // A concurrent insert won and this event updated that row. The
            // row keeps its owner.
            Some(row) => {
                let current = Subscription::try_from(row)?;
                SubscriptionTransition {
                    previous: Some(current.clone()),
                    current,
                    result: ApplyResult::Applied,
                    integrations_deactivated: 0,
                }
            }
            None => {
                let current = lock_by_billing_id(&mut tx, &change.billing_subscription_id)
                    .await?
                    .ok_or_else(|| vanished_row(&change.billing_subscription_id))?;
                commit(tx).await?;
                return Ok(SubscriptionTransition {
                    previous: Some(current.clone()),
                    current,
                    result: ApplyResult::Stale,
                    integrations_deactivated: 0,
                });
            }
        };

        let status = AccountStatus::from_billing(&change.status);
        set_account_status(&mut tx, &transition.current.user_id, status, now).await?;
        commit(tx).await?;
        Ok(transition)
    }

    async fn update_existing(
        &self,
        change: &SubscriptionChange,
        now: Timestamp,
    ) -> Result<Option<SubscriptionTransition>, DomainError> {
        let mut tx = begin(&self.pool).await?;

        let Some(row) = lock_by_billing_id(&mut tx, &change.billing_subscription_id).await? else {
            return Ok(None);
        };

        let transition = apply_locked(&mut tx, row, change, now).await?;
        commit(tx).await?;
        Ok(Some(transition))
    }

    async fn cancel(
        &self,
        billing_subscription_id: &str,
        event_at: Timestamp,
        now: Timestamp,
    ) -> Result<Option<SubscriptionTransition>, DomainError> {
        let mut tx = begin(&self.pool).await?;

        let Some(mut row) = lock_by_billing_id(&mut tx, billing_subscription_id).await? else {
            return Ok(None);
        };

        let previous = row.clone();
        let result = row.cancel(event_at, now);
        let mut transition = SubscriptionTransition {
            previous: Some(previous),
            current: row,
            result,
            integrations_deactivated: 0,
        };

        if result == ApplyResult::Applied {
            write_row(&mut tx, &transition.current).await?;
            let owner = transition.current.user_id;
            set_account_status(&mut tx, &owner, AccountStatus::Free, now).await?;

            let deactivated = sqlx::query(
                r#"
                UPDATE integrations
                SET is_active = FALSE, updated_at = $2
                WHERE user_id = $1 AND is_premium AND is_active
                "#,
            )
            .bind(owner.as_uuid())
            .bind(now.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to deactivate premium integrations", e))?;

            transition.integrations_deactivated = deactivated.rows_affected();
        }

        commit(tx).await?;
        Ok(Some(transition))
    }

    async fn find_by_billing_id(
        &self,
        billing_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE billing_subscription_id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(billing_subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn current_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        let active_like: Vec<&str> = BillingStatus::ACTIVE_LIKE.to_vec();

        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM subscriptions
            WHERE user_id = $1 AND status = ANY($2)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(active_like)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read current subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }
}

fn vanished_row(billing_subscription_id: &str) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!(
            "Subscription {} vanished after a conflicting insert",
            billing_subscription_id
        ),
    )
}
