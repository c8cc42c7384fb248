//! CreateCheckoutSessionHandler - Opens a hosted subscription checkout.

use std::sync::Arc;

use super::customer::{resolve_customer, upstream};
use crate::domain::billing::{BillingError, BillingPeriod, Plan, PriceTable};
use crate::domain::foundation::MemberId;
use crate::ports::{
    CreateCheckoutRequest, MemberRepository, PaymentProvider, SubscriptionRepository,
};

#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub member_id: MemberId,
    pub plan: Plan,
    pub period: BillingPeriod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    pub checkout_url: String,
}

/// Handler for starting a subscription purchase.
///
/// The price lookup and the live-subscription check happen before any
/// processor call, so a rejected request never creates a customer.
pub struct CreateCheckoutSessionHandler {
    members: Arc<dyn MemberRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentProvider>,
    prices: PriceTable,
    app_base_url: String,
}

impl CreateCheckoutSessionHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentProvider>,
        prices: PriceTable,
        app_base_url: impl Into<String>,
    ) -> Self {
        Self {
            members,
            subscriptions,
            payments,
            prices,
            app_base_url: app_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, BillingError> {
        let price_id = self
            .prices
            .price_for(cmd.plan, cmd.period)
            .ok_or_else(|| BillingError::configuration(cmd.plan, cmd.period))?
            .to_string();

        if let Some(current) = self
            .subscriptions
            .find_live_for_member(&cmd.member_id)
            .await?
        {
            if current.has_access() {
                return Err(BillingError::InvalidState(
                    "Member already has an active subscription".to_string(),
                ));
            }
        }

        let customer_id =
            resolve_customer(self.members.as_ref(), self.payments.as_ref(), &cmd.member_id)
                .await?;

        let session = self
            .payments
            .create_checkout_session(CreateCheckoutRequest {
                customer_id,
                price_id,
                success_url: format!(
                    "{}/dashboard/billing?checkout=success&session_id={{CHECKOUT_SESSION_ID}}",
                    self.app_base_url
                ),
                cancel_url: format!("{}/dashboard/billing?checkout=cancelled", self.app_base_url),
                metadata: vec![
                    ("member_id".to_string(), cmd.member_id.to_string()),
                    ("plan".to_string(), cmd.plan.to_string()),
                    ("period".to_string(), cmd.period.to_string()),
                ],
            })
            .await
            .map_err(|e| upstream("create_checkout_session", e))?;

        tracing::info!(
            member_id = %cmd.member_id,
            plan = %cmd.plan,
            period = %cmd.period,
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            checkout_url: session.url,
        })
    }
}
