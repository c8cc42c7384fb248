//! HTTP adapter for billing and the Stripe webhook receiver.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{billing_routes, webhook_routes};
