//! HTTP adapter for the member and organization directory.
//!
//! - `GET /api/members` - Directory listing
//! - `GET|PUT /api/members/me` - Own record
//! - `POST /api/members/me/profile-setup` - Complete onboarding
//! - `GET /api/members/:id` - Member profile
//! - `GET|POST /api/organizations` - List / create organizations
//! - `GET /api/organizations/:id` - Organization with roster
//! - `POST /api/organizations/:id/members` - Add or change a roster entry

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{member_routes, organization_routes};
