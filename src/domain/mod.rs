//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, time, paging, errors)
//! - `directory` - Members and organizations
//! - `workflow` - Opportunities and applications
//! - `messaging` - Threaded member messages
//! - `billing` - Plans, subscriptions, payments and Stripe webhooks
//! - `session` - Page gating policy

pub mod billing;
pub mod directory;
pub mod foundation;
pub mod messaging;
pub mod session;
pub mod workflow;
