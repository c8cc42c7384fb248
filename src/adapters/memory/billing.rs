//! In-memory subscription and payment storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::{Payment, RecordOutcome, Subscription};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, SubscriptionId};
use crate::ports::{PaymentLedger, SubscriptionRepository};

#[derive(Debug, Default, Clone)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<HashMap<SubscriptionId, Subscription>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn count(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn upsert_by_external_id(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, DomainError> {
        let mut subs = self.subscriptions.write().await;
        let live_conflict = !subscription.is_terminated()
            && subs.values().any(|s| {
                s.member_id == subscription.member_id
                    && s.stripe_subscription_id != subscription.stripe_subscription_id
                    && !s.is_terminated()
            });
        if live_conflict {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                "Member already has a live subscription",
            ));
        }
        let existing_id = subs
            .values()
            .find(|s| s.stripe_subscription_id == subscription.stripe_subscription_id)
            .map(|s| (s.id, s.created_at));

        let mut stored = subscription.clone();
        if let Some((id, created_at)) = existing_id {
            stored.id = id;
            stored.created_at = created_at;
        }
        subs.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subs = self.subscriptions.write().await;
        match subs.get_mut(&subscription.id) {
            Some(existing) => {
                *existing = subscription.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            )),
        }
    }

    async fn find_by_external_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .find(|s| s.stripe_subscription_id == stripe_subscription_id)
            .cloned())
    }

    async fn find_for_member(
        &self,
        id: &SubscriptionId,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .get(id)
            .filter(|s| s.member_id == *member_id)
            .cloned())
    }

    async fn find_live_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .find(|s| s.member_id == *member_id && !s.is_terminated())
            .cloned())
    }

    async fn find_current_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.member_id == *member_id)
            .max_by_key(|s| (!s.is_terminated(), s.updated_at))
            .cloned())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPaymentLedger {
    payments: Arc<RwLock<Vec<Payment>>>,
}

impl InMemoryPaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn record(&self, payment: &Payment) -> Result<RecordOutcome, DomainError> {
        let mut payments = self.payments.write().await;
        if payments
            .iter()
            .any(|p| p.stripe_invoice_id == payment.stripe_invoice_id)
        {
            return Ok(RecordOutcome::AlreadyRecorded);
        }
        payments.push(payment.clone());
        Ok(RecordOutcome::Inserted)
    }

    async fn recent_for_member(
        &self,
        member_id: &MemberId,
        limit: u32,
    ) -> Result<Vec<Payment>, DomainError> {
        let mut matching: Vec<Payment> = self
            .payments
            .read()
            .await
            .iter()
            .filter(|p| p.member_id == *member_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        matching.truncate(limit as usize);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{BillingPeriod, Plan};
    use crate::domain::foundation::Timestamp;

    fn subscription(member_id: MemberId, external_id: &str) -> Subscription {
        Subscription::from_checkout(
            member_id,
            external_id,
            "cus_1",
            Plan::Basic,
            BillingPeriod::Monthly,
            None,
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn second_live_subscription_is_rejected() {
        let repo = InMemorySubscriptionRepository::new();
        let member_id = MemberId::new();
        repo.upsert_by_external_id(&subscription(member_id, "sub_1"))
            .await
            .unwrap();

        let err = repo
            .upsert_by_external_id(&subscription(member_id, "sub_2"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn current_prefers_the_live_row() {
        let repo = InMemorySubscriptionRepository::new();
        let member_id = MemberId::new();
        let live = repo
            .upsert_by_external_id(&subscription(member_id, "sub_live"))
            .await
            .unwrap();
        let mut ended = subscription(member_id, "sub_ended");
        ended.terminate(None, Timestamp::now().add_days(1));
        repo.upsert_by_external_id(&ended).await.unwrap();

        let current = repo.find_current_for_member(&member_id).await.unwrap().unwrap();
        assert_eq!(current.id, live.id);
    }
}
