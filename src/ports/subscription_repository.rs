//! Subscription repository port.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, MemberId, SubscriptionId};

/// Persistence for subscription mirrors.
///
/// A member has at most one live row; the external subscription id is unique.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Inserts or updates keyed by `stripe_subscription_id`.
    ///
    /// Returns the stored row; on conflict the existing local id is kept.
    async fn upsert_by_external_id(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, DomainError>;

    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the row doesn't exist
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    async fn find_by_external_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Looks up a subscription only if it belongs to `member_id`.
    async fn find_for_member(
        &self,
        id: &SubscriptionId,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// The member's row that has not been cancelled, if any.
    async fn find_live_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// The live row when there is one, else the most recently updated.
    async fn find_current_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError>;
}
