//! PostgreSQL implementation of OpportunityRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, like_pattern, parse_column, to_total};
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, OpportunityId, OrganizationId, Page, PageResult, Timestamp,
};
use crate::domain::workflow::{Compensation, Opportunity, OpportunityFilter, Schedule};
use crate::ports::OpportunityRepository;

pub struct PostgresOpportunityRepository {
    pool: PgPool,
}

impl PostgresOpportunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OpportunityRow {
    id: Uuid,
    poster_id: Uuid,
    organization_id: Option<Uuid>,
    title: String,
    description: String,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    application_deadline: Option<DateTime<Utc>>,
    format: String,
    location: Option<String>,
    topics: Vec<String>,
    compensation_kind: String,
    compensation_amount: Option<i64>,
    compensation_currency: Option<String>,
    status: String,
    application_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OpportunityRow> for Opportunity {
    type Error = DomainError;

    fn try_from(row: OpportunityRow) -> Result<Self, Self::Error> {
        let compensation = Compensation::from_parts(
            &row.compensation_kind,
            row.compensation_amount,
            row.compensation_currency,
        )
        .map_err(|e| DomainError::database(format!("Invalid compensation: {}", e)))?;

        Ok(Opportunity {
            id: OpportunityId::from_uuid(row.id),
            poster_id: MemberId::from_uuid(row.poster_id),
            organization_id: row.organization_id.map(OrganizationId::from_uuid),
            title: row.title,
            description: row.description,
            schedule: Schedule {
                starts_at: Timestamp::from_datetime(row.starts_at),
                ends_at: row.ends_at.map(Timestamp::from_datetime),
                application_deadline: row.application_deadline.map(Timestamp::from_datetime),
            },
            format: parse_column("format", &row.format)?,
            location: row.location,
            topics: row.topics,
            compensation,
            status: parse_column("status", &row.status)?,
            application_count: row.application_count,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Splits compensation into (kind, amount, currency) columns.
fn compensation_columns(compensation: &Compensation) -> (&'static str, Option<i64>, Option<&str>) {
    match compensation {
        Compensation::Paid {
            amount_cents,
            currency,
        } => ("paid", Some(*amount_cents), Some(currency.as_str())),
        other => (other.kind(), None, None),
    }
}

const SELECT_OPPORTUNITY: &str = r#"
    SELECT id, poster_id, organization_id, title, description, starts_at, ends_at,
           application_deadline, format, location, topics, compensation_kind,
           compensation_amount, compensation_currency, status, application_count,
           created_at, updated_at
    FROM opportunities
"#;

// $1 viewer, $2 status, $3 format, $4 organization, $5 ILIKE pattern
const OPPORTUNITY_FILTER: &str = r#"
    WHERE (status <> 'draft' OR poster_id = $1)
      AND ($2::text IS NULL OR status = $2)
      AND ($3::text IS NULL OR format = $3)
      AND ($4::uuid IS NULL OR organization_id = $4)
      AND ($5::text IS NULL OR title ILIKE $5 OR description ILIKE $5)
"#;

#[async_trait]
impl OpportunityRepository for PostgresOpportunityRepository {
    async fn save(&self, opportunity: &Opportunity) -> Result<(), DomainError> {
        let (kind, amount, currency) = compensation_columns(&opportunity.compensation);

        sqlx::query(
            r#"
            INSERT INTO opportunities (
                id, poster_id, organization_id, title, description, starts_at, ends_at,
                application_deadline, format, location, topics, compensation_kind,
                compensation_amount, compensation_currency, status, application_count,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(opportunity.id.as_uuid())
        .bind(opportunity.poster_id.as_uuid())
        .bind(opportunity.organization_id.map(|o| *o.as_uuid()))
        .bind(&opportunity.title)
        .bind(&opportunity.description)
        .bind(opportunity.schedule.starts_at.as_datetime())
        .bind(opportunity.schedule.ends_at.map(|t| *t.as_datetime()))
        .bind(opportunity.schedule.application_deadline.map(|t| *t.as_datetime()))
        .bind(opportunity.format.as_str())
        .bind(&opportunity.location)
        .bind(&opportunity.topics)
        .bind(kind)
        .bind(amount)
        .bind(currency)
        .bind(opportunity.status.as_str())
        .bind(opportunity.application_count)
        .bind(opportunity.created_at.as_datetime())
        .bind(opportunity.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save opportunity", e))?;

        Ok(())
    }

    async fn update(&self, opportunity: &Opportunity) -> Result<(), DomainError> {
        let (kind, amount, currency) = compensation_columns(&opportunity.compensation);

        // application_count is owned by the application writes.
        let result = sqlx::query(
            r#"
            UPDATE opportunities SET
                organization_id = $2,
                title = $3,
                description = $4,
                starts_at = $5,
                ends_at = $6,
                application_deadline = $7,
                format = $8,
                location = $9,
                topics = $10,
                compensation_kind = $11,
                compensation_amount = $12,
                compensation_currency = $13,
                status = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(opportunity.id.as_uuid())
        .bind(opportunity.organization_id.map(|o| *o.as_uuid()))
        .bind(&opportunity.title)
        .bind(&opportunity.description)
        .bind(opportunity.schedule.starts_at.as_datetime())
        .bind(opportunity.schedule.ends_at.map(|t| *t.as_datetime()))
        .bind(opportunity.schedule.application_deadline.map(|t| *t.as_datetime()))
        .bind(opportunity.format.as_str())
        .bind(&opportunity.location)
        .bind(&opportunity.topics)
        .bind(kind)
        .bind(amount)
        .bind(currency)
        .bind(opportunity.status.as_str())
        .bind(opportunity.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update opportunity", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OpportunityNotFound,
                "Opportunity not found",
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &OpportunityId) -> Result<Option<Opportunity>, DomainError> {
        let row: Option<OpportunityRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_OPPORTUNITY))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find opportunity", e))?;

        row.map(Opportunity::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &OpportunityFilter,
        viewer: &MemberId,
        page: Page,
    ) -> Result<PageResult<Opportunity>, DomainError> {
        let status = filter.status.map(|s| s.as_str());
        let format = filter.format.map(|f| f.as_str());
        let organization = filter.organization_id.map(|o| *o.as_uuid());
        let pattern = like_pattern(filter.query.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM opportunities {}",
            OPPORTUNITY_FILTER
        ))
        .bind(viewer.as_uuid())
        .bind(status)
        .bind(format)
        .bind(organization)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count opportunities", e))?;

        let rows: Vec<OpportunityRow> = sqlx::query_as(&format!(
            "{} {} ORDER BY created_at DESC, id ASC LIMIT $6 OFFSET $7",
            SELECT_OPPORTUNITY, OPPORTUNITY_FILTER
        ))
        .bind(viewer.as_uuid())
        .bind(status)
        .bind(format)
        .bind(organization)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list opportunities", e))?;

        let items = rows
            .into_iter()
            .map(Opportunity::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResult::new(items, to_total(total), page))
    }
}
