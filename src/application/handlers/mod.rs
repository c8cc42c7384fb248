//! Application handlers, grouped by component.
//!
//! - `directory` - Members, profiles and organizations
//! - `workflow` - Opportunities and applications
//! - `messaging` - Member-to-member threads
//! - `billing` - Checkout, subscriptions and Stripe webhooks

pub mod billing;
pub mod directory;
pub mod messaging;
pub mod workflow;
