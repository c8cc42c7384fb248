//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Webhook writes go through `upsert_by_external_id`, keyed by the unique
//! `stripe_subscription_id`, so redelivered events update the same row.
//! A partial unique index keeps at most one non-cancelled row per member.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, parse_column};
use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, SubscriptionId, Timestamp};
use crate::ports::SubscriptionRepository;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    member_id: Uuid,
    stripe_subscription_id: String,
    stripe_customer_id: String,
    stripe_price_id: Option<String>,
    plan: String,
    period: String,
    status: String,
    cancel_at_period_end: bool,
    cancelled_at: Option<DateTime<Utc>>,
    current_period_start: DateTime<Utc>,
    current_period_end: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            member_id: MemberId::from_uuid(row.member_id),
            stripe_subscription_id: row.stripe_subscription_id,
            stripe_customer_id: row.stripe_customer_id,
            stripe_price_id: row.stripe_price_id,
            plan: parse_column("plan", &row.plan)?,
            period: parse_column("period", &row.period)?,
            status: parse_column("status", &row.status)?,
            cancel_at_period_end: row.cancel_at_period_end,
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            current_period_start: Timestamp::from_datetime(row.current_period_start),
            current_period_end: Timestamp::from_datetime(row.current_period_end),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SUBSCRIPTION_COLUMNS: &str = r#"
    id, member_id, stripe_subscription_id, stripe_customer_id, stripe_price_id, plan, period,
    status, cancel_at_period_end, cancelled_at, current_period_start, current_period_end,
    created_at, updated_at
"#;

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn upsert_by_external_id(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, DomainError> {
        let row: SubscriptionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO subscriptions ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (stripe_subscription_id) DO UPDATE SET
                member_id = EXCLUDED.member_id,
                stripe_customer_id = EXCLUDED.stripe_customer_id,
                stripe_price_id = COALESCE(EXCLUDED.stripe_price_id, subscriptions.stripe_price_id),
                plan = EXCLUDED.plan,
                period = EXCLUDED.period,
                status = EXCLUDED.status,
                cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                cancelled_at = EXCLUDED.cancelled_at,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                updated_at = EXCLUDED.updated_at
            RETURNING {cols}
            "#,
            cols = SUBSCRIPTION_COLUMNS
        ))
        .bind(subscription.id.as_uuid())
        .bind(subscription.member_id.as_uuid())
        .bind(&subscription.stripe_subscription_id)
        .bind(&subscription.stripe_customer_id)
        .bind(&subscription.stripe_price_id)
        .bind(subscription.plan.as_str())
        .bind(subscription.period.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.cancelled_at.map(|t| *t.as_datetime()))
        .bind(subscription.current_period_start.as_datetime())
        .bind(subscription.current_period_end.as_datetime())
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("upsert subscription", e))?;

        Subscription::try_from(row)
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                stripe_price_id = $2,
                plan = $3,
                period = $4,
                status = $5,
                cancel_at_period_end = $6,
                cancelled_at = $7,
                current_period_start = $8,
                current_period_end = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(&subscription.stripe_price_id)
        .bind(subscription.plan.as_str())
        .bind(subscription.period.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.cancelled_at.map(|t| *t.as_datetime()))
        .bind(subscription.current_period_start.as_datetime())
        .bind(subscription.current_period_end.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            ));
        }
        Ok(())
    }

    async fn find_by_external_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE stripe_subscription_id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(stripe_subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_for_member(
        &self,
        id: &SubscriptionId,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1 AND member_id = $2",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_live_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE member_id = $1 AND status <> 'cancelled'",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find live subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_current_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM subscriptions WHERE member_id = $1
            ORDER BY (status <> 'cancelled') DESC, updated_at DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find current subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }
}
