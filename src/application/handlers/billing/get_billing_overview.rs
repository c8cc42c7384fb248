//! GetBillingOverviewHandler - Query for the member's billing page.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Payment, Subscription};
use crate::domain::directory::SubscriptionTier;
use crate::domain::foundation::MemberId;
use crate::ports::{MemberRepository, PaymentLedger, SubscriptionRepository};

/// Payments listed on the overview.
pub const RECENT_PAYMENTS_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub struct GetBillingOverviewQuery {
    pub member_id: MemberId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingOverview {
    pub tier: SubscriptionTier,
    pub has_payment_customer: bool,
    /// Latest subscription, ended ones included.
    pub subscription: Option<Subscription>,
    pub recent_payments: Vec<Payment>,
}

pub struct GetBillingOverviewHandler {
    members: Arc<dyn MemberRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    ledger: Arc<dyn PaymentLedger>,
}

impl GetBillingOverviewHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        ledger: Arc<dyn PaymentLedger>,
    ) -> Self {
        Self {
            members,
            subscriptions,
            ledger,
        }
    }

    pub async fn handle(&self, query: GetBillingOverviewQuery) -> Result<BillingOverview, BillingError> {
        let member = self
            .members
            .find_by_id(&query.member_id)
            .await?
            .ok_or(BillingError::NotFound("Member"))?;

        let subscription = self
            .subscriptions
            .find_current_for_member(&member.id)
            .await?;
        let recent_payments = self
            .ledger
            .recent_for_member(&member.id, RECENT_PAYMENTS_LIMIT)
            .await?;

        Ok(BillingOverview {
            tier: member.tier,
            has_payment_customer: member.stripe_customer_id.is_some(),
            subscription,
            recent_payments,
        })
    }
}
