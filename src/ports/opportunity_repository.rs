//! Opportunity repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MemberId, OpportunityId, Page, PageResult};
use crate::domain::workflow::{Opportunity, OpportunityFilter};

/// Persistence for opportunities.
///
/// `application_count` is owned by [`ApplicationRepository`]; `update`
/// leaves it untouched.
///
/// [`ApplicationRepository`]: super::ApplicationRepository
#[async_trait]
pub trait OpportunityRepository: Send + Sync {
    async fn save(&self, opportunity: &Opportunity) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `OpportunityNotFound` if the opportunity doesn't exist
    async fn update(&self, opportunity: &Opportunity) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &OpportunityId) -> Result<Option<Opportunity>, DomainError>;

    /// Opportunities matching `filter` that `viewer` may see, newest first.
    async fn list(
        &self,
        filter: &OpportunityFilter,
        viewer: &MemberId,
        page: Page,
    ) -> Result<PageResult<Opportunity>, DomainError>;
}
