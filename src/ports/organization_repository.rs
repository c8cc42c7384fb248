//! Organization repository port.

use async_trait::async_trait;

use crate::domain::directory::{
    Organization, OrganizationFilter, OrganizationMembership, OrganizationRole,
};
use crate::domain::foundation::{DomainError, MemberId, OrganizationId, Page, PageResult};

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Inserts the organization and its first owner atomically.
    async fn create_with_owner(
        &self,
        organization: &Organization,
        owner: &OrganizationMembership,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError>;

    async fn list(
        &self,
        filter: &OrganizationFilter,
        page: Page,
    ) -> Result<PageResult<Organization>, DomainError>;

    async fn members(
        &self,
        id: &OrganizationId,
    ) -> Result<Vec<OrganizationMembership>, DomainError>;

    async fn role_of(
        &self,
        id: &OrganizationId,
        member_id: &MemberId,
    ) -> Result<Option<OrganizationRole>, DomainError>;

    /// Inserts the membership or changes the role of an existing one.
    async fn upsert_membership(&self, membership: &OrganizationMembership)
        -> Result<(), DomainError>;
}
