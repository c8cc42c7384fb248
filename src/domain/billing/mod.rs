//! Billing reconciliation: plans, subscriptions, the payment ledger and
//! Stripe webhook verification.

mod errors;
mod payment;
mod plan;
mod stripe_event;
mod subscription;
mod webhook_errors;
mod webhook_verifier;

pub use errors::BillingError;
pub use payment::{Payment, RecordOutcome};
pub use plan::{BillingPeriod, Plan, PriceTable};
pub use stripe_event::{
    CheckoutSessionObject, InvoiceObject, StripeEvent, StripeEventData, StripeEventType,
    SubscriptionObject,
};
pub use subscription::{ProviderSubscriptionState, Subscription, SubscriptionStatus};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier, MAX_EVENT_AGE_SECS};
