//! PostgreSQL implementation of OrganizationRepository.
//!
//! The organization row and its first owner are written in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, like_pattern, parse_column, to_total};
use crate::domain::directory::{
    Organization, OrganizationFilter, OrganizationMembership, OrganizationRole,
};
use crate::domain::foundation::{
    DomainError, MemberId, OrganizationId, Page, PageResult, Timestamp,
};
use crate::ports::OrganizationRepository;

pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    organization_type: String,
    description: Option<String>,
    location: Option<String>,
    website: Option<String>,
    size: Option<String>,
    industry: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = DomainError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        Ok(Organization {
            id: OrganizationId::from_uuid(row.id),
            name: row.name,
            organization_type: parse_column("organization_type", &row.organization_type)?,
            description: row.description,
            location: row.location,
            website: row.website,
            size: row.size,
            industry: row.industry,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    organization_id: Uuid,
    member_id: Uuid,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for OrganizationMembership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(OrganizationMembership {
            organization_id: OrganizationId::from_uuid(row.organization_id),
            member_id: MemberId::from_uuid(row.member_id),
            role: parse_column("role", &row.role)?,
            joined_at: Timestamp::from_datetime(row.joined_at),
        })
    }
}

const SELECT_ORGANIZATION: &str = r#"
    SELECT id, name, organization_type, description, location, website, size, industry,
           created_at, updated_at
    FROM organizations
"#;

const ORGANIZATION_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR organization_type = $1)
      AND ($2::text IS NULL OR name ILIKE $2)
"#;

const UPSERT_MEMBERSHIP: &str = r#"
    INSERT INTO organization_members (organization_id, member_id, role, joined_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (organization_id, member_id) DO UPDATE SET role = EXCLUDED.role
"#;

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn create_with_owner(
        &self,
        organization: &Organization,
        owner: &OrganizationMembership,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO organizations (
                id, name, organization_type, description, location, website, size, industry,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(organization.id.as_uuid())
        .bind(&organization.name)
        .bind(organization.organization_type.as_str())
        .bind(&organization.description)
        .bind(&organization.location)
        .bind(&organization.website)
        .bind(&organization.size)
        .bind(&organization.industry)
        .bind(organization.created_at.as_datetime())
        .bind(organization.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("insert organization", e))?;

        sqlx::query(UPSERT_MEMBERSHIP)
            .bind(owner.organization_id.as_uuid())
            .bind(owner.member_id.as_uuid())
            .bind(owner.role.as_str())
            .bind(owner.joined_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("insert organization owner", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit organization", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError> {
        let row: Option<OrganizationRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_ORGANIZATION))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find organization", e))?;

        row.map(Organization::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &OrganizationFilter,
        page: Page,
    ) -> Result<PageResult<Organization>, DomainError> {
        let org_type = filter.organization_type.map(|t| t.as_str());
        let pattern = like_pattern(filter.query.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM organizations {}",
            ORGANIZATION_FILTER
        ))
        .bind(org_type)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count organizations", e))?;

        let rows: Vec<OrganizationRow> = sqlx::query_as(&format!(
            "{} {} ORDER BY name ASC, id ASC LIMIT $3 OFFSET $4",
            SELECT_ORGANIZATION, ORGANIZATION_FILTER
        ))
        .bind(org_type)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list organizations", e))?;

        let items = rows
            .into_iter()
            .map(Organization::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResult::new(items, to_total(total), page))
    }

    async fn members(
        &self,
        id: &OrganizationId,
    ) -> Result<Vec<OrganizationMembership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(
            r#"
            SELECT organization_id, member_id, role, joined_at
            FROM organization_members
            WHERE organization_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list organization members", e))?;

        rows.into_iter()
            .map(OrganizationMembership::try_from)
            .collect()
    }

    async fn role_of(
        &self,
        id: &OrganizationId,
        member_id: &MemberId,
    ) -> Result<Option<OrganizationRole>, DomainError> {
        let role: Option<String> = sqlx::query_scalar(
            "SELECT role FROM organization_members WHERE organization_id = $1 AND member_id = $2",
        )
        .bind(id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("read organization role", e))?;

        role.map(|r| parse_column("role", &r)).transpose()
    }

    async fn upsert_membership(
        &self,
        membership: &OrganizationMembership,
    ) -> Result<(), DomainError> {
        sqlx::query(UPSERT_MEMBERSHIP)
            .bind(membership.organization_id.as_uuid())
            .bind(membership.member_id.as_uuid())
            .bind(membership.role.as_str())
            .bind(membership.joined_at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("upsert organization member", e))?;
        Ok(())
    }
}
