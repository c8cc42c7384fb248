//! Billing command and query handlers.

mod cancel_subscription;
mod create_checkout_session;
mod create_setup_session;
mod customer;
mod get_billing_overview;
mod handle_webhook;

#[cfg(test)]
mod test_support;

pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, ReactivateSubscriptionCommand,
    ReactivateSubscriptionHandler,
};
pub use create_checkout_session::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
};
pub use create_setup_session::{
    CreateSetupSessionCommand, CreateSetupSessionHandler, CreateSetupSessionResult,
};
pub use get_billing_overview::{
    BillingOverview, GetBillingOverviewHandler, GetBillingOverviewQuery, RECENT_PAYMENTS_LIMIT,
};
pub use handle_webhook::{HandleWebhookCommand, HandleWebhookHandler, HandleWebhookResult};
