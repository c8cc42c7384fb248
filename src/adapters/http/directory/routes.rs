//! Axum routes for the member and organization directory.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    add_organization_member, complete_profile_setup, create_organization, get_me, get_member,
    get_organization, list_members, list_organizations, update_me,
};

/// Mounted at `/api/members`.
///
/// - `GET /` - Directory listing (role, topic, q, page, per_page)
/// - `GET|PUT /me` - Own record
/// - `POST /me/profile-setup` - Create or complete the caller's member record
/// - `GET /:id` - Public profile
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members))
        .route("/me", get(get_me).put(update_me))
        .route("/me/profile-setup", post(complete_profile_setup))
        .route("/:id", get(get_member))
}

/// Mounted at `/api/organizations`.
pub fn organization_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route("/:id", get(get_organization))
        .route("/:id/members", post(add_organization_member))
}
