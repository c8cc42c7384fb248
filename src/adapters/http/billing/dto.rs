//! Request and response bodies for the billing endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{
    BillingOverview, CreateCheckoutSessionResult, CreateSetupSessionResult,
};
use crate::domain::billing::{BillingPeriod, Payment, Plan, Subscription};
use crate::domain::directory::SubscriptionTier;

/// POST /api/billing/checkout
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CheckoutRequest {
    pub plan: Plan,
    pub period: BillingPeriod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub checkout_url: String,
}

impl From<CreateCheckoutSessionResult> for CheckoutResponse {
    fn from(result: CreateCheckoutSessionResult) -> Self {
        Self {
            session_id: result.session_id,
            checkout_url: result.checkout_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupResponse {
    pub session_id: String,
    pub setup_url: String,
}

impl From<CreateSetupSessionResult> for SetupResponse {
    fn from(result: CreateSetupSessionResult) -> Self {
        Self {
            session_id: result.session_id,
            setup_url: result.setup_url,
        }
    }
}

/// GET /api/billing/subscription
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingOverviewResponse {
    pub tier: SubscriptionTier,
    pub has_payment_customer: bool,
    pub subscription: Option<Subscription>,
    pub recent_payments: Vec<Payment>,
}

impl From<BillingOverview> for BillingOverviewResponse {
    fn from(overview: BillingOverview) -> Self {
        Self {
            tier: overview.tier,
            has_payment_customer: overview.has_payment_customer,
            subscription: overview.subscription,
            recent_payments: overview.recent_payments,
        }
    }
}

/// Body of every accepted webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}
