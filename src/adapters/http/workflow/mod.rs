//! HTTP adapter for opportunities and applications.
//!
//! - `GET|POST /api/opportunities` - List / post opportunities
//! - `GET /api/opportunities/:id` - One opportunity
//! - `PATCH /api/opportunities/:id/status` - Poster changes status
//! - `GET|POST /api/opportunities/:id/applications` - Poster's list / speaker applies
//! - `GET /api/applications` - Caller's own applications
//! - `PATCH /api/applications/:id/status` - Accept, reject or withdraw

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{application_routes, opportunity_routes};
