//! PostgreSQL implementation of MemberRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, like_pattern, parse_column, to_total};
use crate::domain::directory::{Member, MemberFilter, Profile, SubscriptionTier};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Page, PageResult, Timestamp};
use crate::ports::MemberRepository;

pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    email: String,
    role: String,
    display_name: String,
    headline: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    website: Option<String>,
    topics: Vec<String>,
    avatar_url: Option<String>,
    onboarding_completed: bool,
    tier: String,
    stripe_customer_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = DomainError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Member {
            id: MemberId::from_uuid(row.id),
            email: row.email,
            role: parse_column("role", &row.role)?,
            profile: Profile {
                display_name: row.display_name,
                headline: row.headline,
                bio: row.bio,
                location: row.location,
                website: row.website,
                topics: row.topics,
                avatar_url: row.avatar_url,
            },
            onboarding_completed: row.onboarding_completed,
            tier: parse_column("tier", &row.tier)?,
            stripe_customer_id: row.stripe_customer_id,
            status: parse_column("status", &row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_MEMBER: &str = r#"
    SELECT id, email, role, display_name, headline, bio, location, website, topics,
           avatar_url, onboarding_completed, tier, stripe_customer_id, status,
           created_at, updated_at
    FROM members
"#;

// $1 role, $2 topic, $3 ILIKE pattern
const MEMBER_FILTER: &str = r#"
    WHERE status = 'active'
      AND ($1::text IS NULL OR role = $1)
      AND ($2::text IS NULL OR $2 = ANY(topics))
      AND ($3::text IS NULL OR display_name ILIKE $3 OR headline ILIKE $3)
"#;

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::MemberNotFound, "Member not found")
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn save(&self, member: &Member) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO members (
                id, email, role, display_name, headline, bio, location, website, topics,
                avatar_url, onboarding_completed, tier, stripe_customer_id, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                role = EXCLUDED.role,
                display_name = EXCLUDED.display_name,
                headline = EXCLUDED.headline,
                bio = EXCLUDED.bio,
                location = EXCLUDED.location,
                website = EXCLUDED.website,
                topics = EXCLUDED.topics,
                avatar_url = EXCLUDED.avatar_url,
                onboarding_completed = EXCLUDED.onboarding_completed,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(member.id.as_uuid())
        .bind(&member.email)
        .bind(member.role.as_str())
        .bind(&member.profile.display_name)
        .bind(&member.profile.headline)
        .bind(&member.profile.bio)
        .bind(&member.profile.location)
        .bind(&member.profile.website)
        .bind(&member.profile.topics)
        .bind(&member.profile.avatar_url)
        .bind(member.onboarding_completed)
        .bind(member.tier.as_str())
        .bind(&member.stripe_customer_id)
        .bind(member.status.as_str())
        .bind(member.created_at.as_datetime())
        .bind(member.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save member", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_MEMBER))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find member", e))?;

        row.map(Member::try_from).transpose()
    }

    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> =
            sqlx::query_as(&format!("{} WHERE stripe_customer_id = $1", SELECT_MEMBER))
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find member by customer", e))?;

        row.map(Member::try_from).transpose()
    }

    async fn set_stripe_customer_id(
        &self,
        id: &MemberId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE members SET stripe_customer_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("set stripe customer id", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn set_tier(&self, id: &MemberId, tier: SubscriptionTier) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE members SET tier = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.as_uuid())
                .bind(tier.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("set member tier", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &MemberFilter,
        page: Page,
    ) -> Result<PageResult<Member>, DomainError> {
        let role = filter.role.map(|r| r.as_str());
        let topic = filter.topic.as_deref().map(str::to_lowercase);
        let pattern = like_pattern(filter.query.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM members {}",
            MEMBER_FILTER
        ))
        .bind(role)
        .bind(&topic)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count members", e))?;

        let rows: Vec<MemberRow> = sqlx::query_as(&format!(
            "{} {} ORDER BY display_name ASC, id ASC LIMIT $4 OFFSET $5",
            SELECT_MEMBER, MEMBER_FILTER
        ))
        .bind(role)
        .bind(&topic)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list members", e))?;

        let items = rows
            .into_iter()
            .map(Member::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResult::new(items, to_total(total), page))
    }
}
