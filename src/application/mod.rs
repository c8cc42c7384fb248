//! Application layer - Commands, Queries, and Handlers.
//!
//! Each handler holds the ports it needs as `Arc<dyn Port>` and exposes a
//! single `handle` method. Commands write, queries read.

pub mod handlers;
