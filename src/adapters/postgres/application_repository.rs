//! PostgreSQL implementation of ApplicationRepository.
//!
//! Every write that can change the number of live applications first locks
//! the opportunity row, then recomputes `opportunities.application_count`
//! from `COUNT(*)` inside the same transaction. Concurrent writers for one
//! opportunity are serialized by that lock, so each recount sees the rows
//! committed before it. Duplicate detection relies on the partial unique
//! index `applications_active_pair_key`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{db_error, parse_column, to_total};
use crate::domain::foundation::{
    ApplicationId, DomainError, ErrorCode, MemberId, OpportunityId, Page, PageResult, Timestamp,
};
use crate::domain::workflow::Application;
use crate::ports::ApplicationRepository;

const ACTIVE_PAIR_CONSTRAINT: &str = "applications_active_pair_key";
const OPPORTUNITY_FK_CONSTRAINT: &str = "applications_opportunity_id_fkey";

pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    opportunity_id: Uuid,
    speaker_id: Uuid,
    cover_letter: String,
    proposed_topic: Option<String>,
    availability_confirmed: bool,
    requested_fee_cents: Option<i64>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = DomainError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: ApplicationId::from_uuid(row.id),
            opportunity_id: OpportunityId::from_uuid(row.opportunity_id),
            speaker_id: MemberId::from_uuid(row.speaker_id),
            cover_letter: row.cover_letter,
            proposed_topic: row.proposed_topic,
            availability_confirmed: row.availability_confirmed,
            requested_fee_cents: row.requested_fee_cents,
            status: parse_column("status", &row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_APPLICATION: &str = r#"
    SELECT id, opportunity_id, speaker_id, cover_letter, proposed_topic,
           availability_confirmed, requested_fee_cents, status, created_at, updated_at
    FROM applications
"#;

/// Maps constraint violations on insert to domain errors.
fn insert_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.constraint() {
            Some(ACTIVE_PAIR_CONSTRAINT) => {
                return DomainError::new(
                    ErrorCode::DuplicateApplication,
                    "You have already applied to this opportunity",
                );
            }
            Some(OPPORTUNITY_FK_CONSTRAINT) => {
                return DomainError::new(ErrorCode::OpportunityNotFound, "Opportunity not found");
            }
            _ => {}
        }
    }
    db_error("insert application", e)
}

/// Takes the opportunity row lock held until the transaction ends.
async fn lock_opportunity(
    tx: &mut Transaction<'_, Postgres>,
    opportunity_id: &OpportunityId,
) -> Result<(), DomainError> {
    let locked: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM opportunities WHERE id = $1 FOR UPDATE")
            .bind(opportunity_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| db_error("lock opportunity", e))?;

    match locked {
        Some(_) => Ok(()),
        None => Err(DomainError::new(
            ErrorCode::OpportunityNotFound,
            "Opportunity not found",
        )),
    }
}

async fn refresh_count(
    tx: &mut Transaction<'_, Postgres>,
    opportunity_id: &OpportunityId,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        UPDATE opportunities
        SET application_count = (
            SELECT COUNT(*) FROM applications
            WHERE opportunity_id = $1 AND status <> 'withdrawn'
        )
        WHERE id = $1
        "#,
    )
    .bind(opportunity_id.as_uuid())
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("refresh application count", e))?;
    Ok(())
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn submit(&self, application: &Application) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        lock_opportunity(&mut tx, &application.opportunity_id).await?;

        sqlx::query(
            r#"
            INSERT INTO applications (
                id, opportunity_id, speaker_id, cover_letter, proposed_topic,
                availability_confirmed, requested_fee_cents, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.opportunity_id.as_uuid())
        .bind(application.speaker_id.as_uuid())
        .bind(&application.cover_letter)
        .bind(&application.proposed_topic)
        .bind(application.availability_confirmed)
        .bind(application.requested_fee_cents)
        .bind(application.status.as_str())
        .bind(application.created_at.as_datetime())
        .bind(application.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(insert_error)?;

        refresh_count(&mut tx, &application.opportunity_id).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit application", e))?;
        Ok(())
    }

    async fn update_status(&self, application: &Application) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        lock_opportunity(&mut tx, &application.opportunity_id).await?;

        let result =
            sqlx::query("UPDATE applications SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(application.id.as_uuid())
                .bind(application.status.as_str())
                .bind(application.updated_at.as_datetime())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("update application status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ApplicationNotFound,
                "Application not found",
            ));
        }

        refresh_count(&mut tx, &application.opportunity_id).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit application status", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>, DomainError> {
        let row: Option<ApplicationRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_APPLICATION))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find application", e))?;

        row.map(Application::try_from).transpose()
    }

    async fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
        page: Page,
    ) -> Result<PageResult<Application>, DomainError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE opportunity_id = $1")
                .bind(opportunity_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("count applications", e))?;

        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "{} WHERE opportunity_id = $1 ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3",
            SELECT_APPLICATION
        ))
        .bind(opportunity_id.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list applications", e))?;

        let items = rows
            .into_iter()
            .map(Application::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResult::new(items, to_total(total), page))
    }

    async fn list_for_speaker(
        &self,
        speaker_id: &MemberId,
        page: Page,
    ) -> Result<PageResult<Application>, DomainError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE speaker_id = $1")
                .bind(speaker_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("count applications", e))?;

        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "{} WHERE speaker_id = $1 ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3",
            SELECT_APPLICATION
        ))
        .bind(speaker_id.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list applications", e))?;

        let items = rows
            .into_iter()
            .map(Application::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResult::new(items, to_total(total), page))
    }
}
