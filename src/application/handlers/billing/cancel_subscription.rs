//! Cancel and reactivate handlers.
//!
//! Both ask the processor first and only then mirror the flag locally. The
//! subscription is looked up scoped by member, so another member's id reads
//! as not found.

use std::sync::Arc;

use super::customer::upstream;
use crate::domain::billing::{BillingError, Subscription};
use crate::domain::foundation::{MemberId, SubscriptionId, Timestamp};
use crate::ports::{PaymentProvider, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub subscription_id: SubscriptionId,
    pub member_id: MemberId,
}

#[derive(Debug, Clone)]
pub struct ReactivateSubscriptionCommand {
    pub subscription_id: SubscriptionId,
    pub member_id: MemberId,
}

async fn load_owned(
    subscriptions: &dyn SubscriptionRepository,
    id: &SubscriptionId,
    member_id: &MemberId,
) -> Result<Subscription, BillingError> {
    subscriptions
        .find_for_member(id, member_id)
        .await?
        .ok_or(BillingError::NotFound("Subscription"))
}

/// Schedules cancellation at the end of the current period.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentProvider>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            subscriptions,
            payments,
        }
    }

    pub async fn handle(&self, cmd: CancelSubscriptionCommand) -> Result<Subscription, BillingError> {
        let mut subscription =
            load_owned(self.subscriptions.as_ref(), &cmd.subscription_id, &cmd.member_id).await?;
        if subscription.is_terminated() {
            return Err(BillingError::InvalidState(
                "Subscription has already ended".to_string(),
            ));
        }

        self.payments
            .set_cancel_at_period_end(&subscription.stripe_subscription_id, true)
            .await
            .map_err(|e| upstream("cancel_subscription", e))?;

        subscription.schedule_cancellation(Timestamp::now())?;
        self.subscriptions.update(&subscription).await?;

        tracing::info!(
            member_id = %cmd.member_id,
            subscription_id = %subscription.id,
            "Subscription set to cancel at period end"
        );
        Ok(subscription)
    }
}

/// Clears a scheduled cancellation.
pub struct ReactivateSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentProvider>,
}

impl ReactivateSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            subscriptions,
            payments,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReactivateSubscriptionCommand,
    ) -> Result<Subscription, BillingError> {
        let mut subscription =
            load_owned(self.subscriptions.as_ref(), &cmd.subscription_id, &cmd.member_id).await?;
        if subscription.is_terminated() {
            return Err(BillingError::InvalidState(
                "Subscription has already ended and cannot be reactivated".to_string(),
            ));
        }

        self.payments
            .set_cancel_at_period_end(&subscription.stripe_subscription_id, false)
            .await
            .map_err(|e| upstream("reactivate_subscription", e))?;

        subscription.reactivate(Timestamp::now())?;
        self.subscriptions.update(&subscription).await?;

        tracing::info!(
            member_id = %cmd.member_id,
            subscription_id = %subscription.id,
            "Subscription reactivated"
        );
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::billing::{BillingPeriod, Plan};
    use crate::ports::PaymentError;

    struct Fixture {
        subscriptions: Arc<InMemorySubscriptionRepository>,
        payments: MockPaymentProvider,
        cancel: CancelSubscriptionHandler,
        reactivate: ReactivateSubscriptionHandler,
    }

    fn fixture() -> Fixture {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let payments = MockPaymentProvider::new();
        Fixture {
            cancel: CancelSubscriptionHandler::new(subscriptions.clone(), Arc::new(payments.clone())),
            reactivate: ReactivateSubscriptionHandler::new(
                subscriptions.clone(),
                Arc::new(payments.clone()),
            ),
            subscriptions,
            payments,
        }
    }

    async fn stored(f: &Fixture, member_id: MemberId) -> Subscription {
        let sub = Subscription::from_checkout(
            member_id,
            "sub_live_1",
            "cus_1",
            Plan::Standard,
            BillingPeriod::Monthly,
            None,
            Timestamp::now(),
        );
        f.subscriptions.upsert_by_external_id(&sub).await.unwrap()
    }

    #[tokio::test]
    async fn cancel_then_reactivate_restores_flags() {
        let f = fixture();
        let member_id = MemberId::new();
        let sub = stored(&f, member_id).await;

        let cancelled = f
            .cancel
            .handle(CancelSubscriptionCommand {
                subscription_id: sub.id,
                member_id,
            })
            .await
            .unwrap();
        assert!(cancelled.cancel_at_period_end);
        assert!(cancelled.cancelled_at.is_some());

        let reactivated = f
            .reactivate
            .handle(ReactivateSubscriptionCommand {
                subscription_id: sub.id,
                member_id,
            })
            .await
            .unwrap();
        assert!(!reactivated.cancel_at_period_end);
        assert!(reactivated.cancelled_at.is_none());

        let persisted = f
            .subscriptions
            .find_for_member(&sub.id, &member_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!persisted.cancel_at_period_end);
        assert!(persisted.cancelled_at.is_none());
        assert_eq!(f.payments.call_count("set_cancel_at_period_end"), 2);
    }

    #[tokio::test]
    async fn other_members_subscription_is_not_found() {
        let f = fixture();
        let sub = stored(&f, MemberId::new()).await;

        let err = f
            .cancel
            .handle(CancelSubscriptionCommand {
                subscription_id: sub.id,
                member_id: MemberId::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::NotFound("Subscription")));
        assert!(f.payments.calls().is_empty());
    }

    #[tokio::test]
    async fn provider_rejection_leaves_local_state_untouched() {
        let f = fixture();
        let member_id = MemberId::new();
        let sub = stored(&f, member_id).await;
        f.payments.set_method_error(
            "set_cancel_at_period_end",
            PaymentError::invalid_request("No such subscription"),
        );

        let err = f
            .cancel
            .handle(CancelSubscriptionCommand {
                subscription_id: sub.id,
                member_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::Upstream(_)));
        let persisted = f
            .subscriptions
            .find_for_member(&sub.id, &member_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!persisted.cancel_at_period_end);
    }

    #[tokio::test]
    async fn terminated_subscription_cannot_be_reactivated() {
        let f = fixture();
        let member_id = MemberId::new();
        let mut sub = stored(&f, member_id).await;
        sub.terminate(None, Timestamp::now());
        f.subscriptions.update(&sub).await.unwrap();

        let err = f
            .reactivate
            .handle(ReactivateSubscriptionCommand {
                subscription_id: sub.id,
                member_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::InvalidState(_)));
        assert!(f.payments.calls().is_empty());
    }
}
