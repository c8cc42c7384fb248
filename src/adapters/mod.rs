//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - axum routers, session gate and error mapping
//! - `postgres` - sqlx repositories
//! - `memory` - in-memory repositories for tests and local runs
//! - `stripe` - Stripe REST client and a recording mock
//! - `auth` - JWT session validation and token refresh
//! - `replay` - Webhook replay guard (Redis, in-memory)

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod replay;
pub mod stripe;
