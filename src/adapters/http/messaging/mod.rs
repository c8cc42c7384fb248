//! HTTP adapter for direct messages.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::message_routes;
