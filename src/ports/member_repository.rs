//! Member repository port.

use async_trait::async_trait;

use crate::domain::directory::{Member, MemberFilter, SubscriptionTier};
use crate::domain::foundation::{DomainError, MemberId, Page, PageResult};

/// Persistence for member records.
///
/// Members are keyed by the identity provider's subject, so `save` is an
/// upsert on `id`.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Inserts or replaces the member.
    async fn save(&self, member: &Member) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError>;

    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<Member>, DomainError>;

    /// Stores the processor customer id.
    ///
    /// # Errors
    ///
    /// - `MemberNotFound` if the member doesn't exist
    async fn set_stripe_customer_id(
        &self,
        id: &MemberId,
        customer_id: &str,
    ) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `MemberNotFound` if the member doesn't exist
    async fn set_tier(&self, id: &MemberId, tier: SubscriptionTier) -> Result<(), DomainError>;

    /// Active members matching `filter`, newest first.
    async fn list(
        &self,
        filter: &MemberFilter,
        page: Page,
    ) -> Result<PageResult<Member>, DomainError>;
}
