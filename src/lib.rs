//! Podium - Marketplace backend connecting speakers with organizations.
//!
//! Speakers publish profiles, organizations post speaking opportunities,
//! speakers apply, members message each other, and organizations pay for
//! tiered subscriptions through Stripe.
//!
//! The crate follows a ports-and-adapters layout: `domain` holds the pure
//! model, `ports` the traits it depends on, `application` the command and
//! query handlers, and `adapters` the HTTP, Postgres, Stripe, Redis and
//! identity-provider implementations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
