//! PostgreSQL implementation of PaymentLedger.
//!
//! `stripe_invoice_id` is unique; a repeated insert is a no-op and reports
//! `AlreadyRecorded`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use crate::domain::billing::{Payment, RecordOutcome};
use crate::domain::foundation::{DomainError, MemberId, PaymentId, SubscriptionId, Timestamp};
use crate::ports::PaymentLedger;

pub struct PostgresPaymentLedger {
    pool: PgPool,
}

impl PostgresPaymentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    member_id: Uuid,
    subscription_id: Option<Uuid>,
    stripe_invoice_id: String,
    stripe_charge_id: Option<String>,
    stripe_payment_intent_id: Option<String>,
    amount_cents: i64,
    currency: String,
    paid_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: PaymentId::from_uuid(row.id),
            member_id: MemberId::from_uuid(row.member_id),
            subscription_id: row.subscription_id.map(SubscriptionId::from_uuid),
            stripe_invoice_id: row.stripe_invoice_id,
            stripe_charge_id: row.stripe_charge_id,
            stripe_payment_intent_id: row.stripe_payment_intent_id,
            amount_cents: row.amount_cents,
            currency: row.currency,
            paid_at: Timestamp::from_datetime(row.paid_at),
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl PaymentLedger for PostgresPaymentLedger {
    async fn record(&self, payment: &Payment) -> Result<RecordOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, member_id, subscription_id, stripe_invoice_id, stripe_charge_id,
                stripe_payment_intent_id, amount_cents, currency, paid_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (stripe_invoice_id) DO NOTHING
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.member_id.as_uuid())
        .bind(payment.subscription_id.map(|s| *s.as_uuid()))
        .bind(&payment.stripe_invoice_id)
        .bind(&payment.stripe_charge_id)
        .bind(&payment.stripe_payment_intent_id)
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(payment.paid_at.as_datetime())
        .bind(payment.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("record payment", e))?;

        Ok(if result.rows_affected() == 0 {
            RecordOutcome::AlreadyRecorded
        } else {
            RecordOutcome::Inserted
        })
    }

    async fn recent_for_member(
        &self,
        member_id: &MemberId,
        limit: u32,
    ) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, subscription_id, stripe_invoice_id, stripe_charge_id,
                   stripe_payment_intent_id, amount_cents, currency, paid_at, created_at
            FROM payments
            WHERE member_id = $1
            ORDER BY paid_at DESC
            LIMIT $2
            "#,
        )
        .bind(member_id.as_uuid())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list payments", e))?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }
}
