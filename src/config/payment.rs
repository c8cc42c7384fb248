//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::billing::{BillingPeriod, Plan, PriceTable};

/// Stripe credentials and the plan × period price ids.
///
/// Price ids are optional here; a missing one fails the matching checkout
/// request, not startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    pub stripe_api_key: String,

    /// Webhook signing secret (`whsec_...`)
    pub stripe_webhook_secret: String,

    /// Overrides `https://api.stripe.com`, e.g. for stripe-mock
    pub stripe_api_base_url: Option<String>,

    pub price_basic_monthly: Option<String>,
    pub price_basic_yearly: Option<String>,
    pub price_standard_monthly: Option<String>,
    pub price_standard_yearly: Option<String>,
    pub price_premium_monthly: Option<String>,
    pub price_premium_yearly: Option<String>,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Static price table for checkout and price-change reconciliation.
    pub fn price_table(&self) -> PriceTable {
        PriceTable::new()
            .with_price(Plan::Basic, BillingPeriod::Monthly, self.price_basic_monthly.clone())
            .with_price(Plan::Basic, BillingPeriod::Yearly, self.price_basic_yearly.clone())
            .with_price(
                Plan::Standard,
                BillingPeriod::Monthly,
                self.price_standard_monthly.clone(),
            )
            .with_price(
                Plan::Standard,
                BillingPeriod::Yearly,
                self.price_standard_yearly.clone(),
            )
            .with_price(
                Plan::Premium,
                BillingPeriod::Monthly,
                self.price_premium_monthly.clone(),
            )
            .with_price(
                Plan::Premium,
                BillingPeriod::Yearly,
                self.price_premium_yearly.clone(),
            )
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__STRIPE_WEBHOOK_SECRET",
            ));
        }
        if !self.stripe_api_key.starts_with("sk_") && !self.stripe_api_key.starts_with("rk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        Ok(())
    }
}
