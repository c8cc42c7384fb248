//! HTTP handlers for member and organization endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::directory::{
    AddOrganizationMemberCommand, CompleteProfileSetupCommand, CreateOrganizationCommand,
    GetMemberQuery, GetOrganizationQuery, ListMembersQuery, ListOrganizationsQuery,
    UpdateProfileCommand,
};
use crate::domain::directory::{OrganizationDetails, Profile};
use crate::domain::foundation::{MemberId, OrganizationId};

use super::dto::{
    AddOrganizationMemberRequest, ListMembersParams, ListOrganizationsParams, MemberResponse,
    OrganizationDetailResponse, ProfileSetupRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Members
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/members/me
pub async fn get_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let member = state
        .get_member_handler()
        .handle(GetMemberQuery { member_id: user.id })
        .await?;
    Ok(Json(MemberResponse::own(member)))
}

/// PUT /api/members/me
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(profile): Json<Profile>,
) -> Result<impl IntoResponse, ApiError> {
    let member = state
        .update_profile_handler()
        .handle(UpdateProfileCommand {
            member_id: user.id,
            profile,
        })
        .await?;
    Ok(Json(MemberResponse::own(member)))
}

/// POST /api/members/me/profile-setup
pub async fn complete_profile_setup(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<ProfileSetupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let member = state
        .complete_profile_setup_handler()
        .handle(CompleteProfileSetupCommand {
            user,
            role: request.role,
            profile: request.profile,
        })
        .await?;
    Ok(Json(MemberResponse::own(member)))
}

/// GET /api/members
pub async fn list_members(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<ListMembersParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = params.into_parts()?;
    let result = state
        .list_members_handler()
        .handle(ListMembersQuery { filter, page })
        .await?;
    Ok(Json(result.map(MemberResponse::public)))
}

/// GET /api/members/:id
pub async fn get_member(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(member_id): Path<MemberId>,
) -> Result<impl IntoResponse, ApiError> {
    let member = state
        .get_member_handler()
        .handle(GetMemberQuery { member_id })
        .await?;
    let response = if member.id == user.id {
        MemberResponse::own(member)
    } else {
        MemberResponse::public(member)
    };
    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// Organizations
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/organizations
pub async fn create_organization(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(details): Json<OrganizationDetails>,
) -> Result<impl IntoResponse, ApiError> {
    let organization = state
        .create_organization_handler()
        .handle(CreateOrganizationCommand {
            creator_id: user.id,
            details,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

/// GET /api/organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<ListOrganizationsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = params.into_parts()?;
    let result = state
        .list_organizations_handler()
        .handle(ListOrganizationsQuery { filter, page })
        .await?;
    Ok(Json(result))
}

/// GET /api/organizations/:id
pub async fn get_organization(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(organization_id): Path<OrganizationId>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .get_organization_handler()
        .handle(GetOrganizationQuery { organization_id })
        .await?;
    Ok(Json(OrganizationDetailResponse::from(view)))
}

/// POST /api/organizations/:id/members
pub async fn add_organization_member(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(organization_id): Path<OrganizationId>,
    Json(request): Json<AddOrganizationMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = state
        .add_organization_member_handler()
        .handle(AddOrganizationMemberCommand {
            organization_id,
            actor_id: user.id,
            member_id: request.member_id,
            role: request.role,
        })
        .await?;
    Ok(Json(membership))
}
