//! Application repository port.

use async_trait::async_trait;

use crate::domain::foundation::{
    ApplicationId, DomainError, MemberId, OpportunityId, Page, PageResult,
};
use crate::domain::workflow::Application;

/// Persistence for applications.
///
/// Both writes recompute the parent opportunity's `application_count` from
/// the non-withdrawn rows inside the same transaction as the write.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Inserts a new application.
    ///
    /// # Errors
    ///
    /// - `DuplicateApplication` when the speaker already has a non-withdrawn
    ///   application for the opportunity (reported by storage, not pre-checked)
    /// - `OpportunityNotFound` if the opportunity row is gone
    async fn submit(&self, application: &Application) -> Result<(), DomainError>;

    /// Persists a status change.
    ///
    /// # Errors
    ///
    /// - `ApplicationNotFound` if the application doesn't exist
    async fn update_status(&self, application: &Application) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>, DomainError>;

    async fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
        page: Page,
    ) -> Result<PageResult<Application>, DomainError>;

    async fn list_for_speaker(
        &self,
        speaker_id: &MemberId,
        page: Page,
    ) -> Result<PageResult<Application>, DomainError>;
}
