//! HTTP handlers for opportunity and application endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::workflow::{
    ChangeApplicationStatusCommand, CreateOpportunityCommand, GetOpportunityQuery,
    ListMyApplicationsQuery, ListOpportunitiesQuery, ListOpportunityApplicationsQuery,
    SubmitApplicationCommand, UpdateOpportunityStatusCommand,
};
use crate::domain::foundation::{ApplicationId, OpportunityId};
use crate::domain::workflow::ApplicationForm;

use super::dto::{
    ApplicationStatusRequest, CreateOpportunityRequest, ListOpportunitiesParams,
    OpportunityStatusRequest, PageParams,
};

// ════════════════════════════════════════════════════════════════════════════════
// Opportunities
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/opportunities
pub async fn create_opportunity(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateOpportunityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let opportunity = state
        .create_opportunity_handler()
        .handle(CreateOpportunityCommand {
            poster_id: user.id,
            input: request.into(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

/// GET /api/opportunities
pub async fn list_opportunities(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListOpportunitiesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = params.into_parts()?;
    let result = state
        .list_opportunities_handler()
        .handle(ListOpportunitiesQuery {
            viewer_id: user.id,
            filter,
            page,
        })
        .await?;
    Ok(Json(result))
}

/// GET /api/opportunities/:id
pub async fn get_opportunity(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(opportunity_id): Path<OpportunityId>,
) -> Result<impl IntoResponse, ApiError> {
    let opportunity = state
        .get_opportunity_handler()
        .handle(GetOpportunityQuery {
            opportunity_id,
            viewer_id: user.id,
        })
        .await?;
    Ok(Json(opportunity))
}

/// PATCH /api/opportunities/:id/status
pub async fn update_opportunity_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(opportunity_id): Path<OpportunityId>,
    Json(request): Json<OpportunityStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let opportunity = state
        .update_opportunity_status_handler()
        .handle(UpdateOpportunityStatusCommand {
            opportunity_id,
            actor_id: user.id,
            status: request.status,
        })
        .await?;
    Ok(Json(opportunity))
}

// ════════════════════════════════════════════════════════════════════════════════
// Applications
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/opportunities/:id/applications
pub async fn submit_application(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(opportunity_id): Path<OpportunityId>,
    Json(form): Json<ApplicationForm>,
) -> Result<impl IntoResponse, ApiError> {
    let application = state
        .submit_application_handler()
        .handle(SubmitApplicationCommand {
            opportunity_id,
            speaker_id: user.id,
            form,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/opportunities/:id/applications
pub async fn list_opportunity_applications(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(opportunity_id): Path<OpportunityId>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .list_opportunity_applications_handler()
        .handle(ListOpportunityApplicationsQuery {
            opportunity_id,
            viewer_id: user.id,
            page: params.page()?,
        })
        .await?;
    Ok(Json(result))
}

/// GET /api/applications
pub async fn list_my_applications(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .list_my_applications_handler()
        .handle(ListMyApplicationsQuery {
            speaker_id: user.id,
            page: params.page()?,
        })
        .await?;
    Ok(Json(result))
}

/// PATCH /api/applications/:id/status
pub async fn change_application_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<ApplicationStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let application = state
        .change_application_status_handler()
        .handle(ChangeApplicationStatusCommand {
            application_id,
            actor_id: user.id,
            status: request.status,
        })
        .await?;
    Ok(Json(application))
}
