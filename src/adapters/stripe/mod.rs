//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port:
//! - Customer creation (idempotent per member)
//! - Hosted checkout and payment-method setup sessions
//! - Cancel-at-period-end toggling
//!
//! The API key is held in a `secrecy::SecretString`.

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
