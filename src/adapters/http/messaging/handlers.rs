//! HTTP handlers for direct messages.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::messaging::{
    GetThreadQuery, ListMessagesQuery, MessageAction, UnreadCountQuery, UpdateMessageCommand,
};
use crate::domain::foundation::{MemberId, MessageId};

use super::dto::{ListMessagesParams, SendMessageRequest, UnreadCountResponse};

/// POST /api/messages
pub async fn send_message(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .send_message_handler()
        .handle(request.into_command(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/messages?folder=inbox|sent|archived
pub async fn list_messages(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListMessagesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (folder, page) = params.into_parts()?;
    let result = state
        .list_messages_handler()
        .handle(ListMessagesQuery {
            member_id: user.id,
            folder,
            page,
        })
        .await?;
    Ok(Json(result))
}

/// GET /api/messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let unread = state
        .unread_count_handler()
        .handle(UnreadCountQuery { member_id: user.id })
        .await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// GET /api/messages/threads/:id
pub async fn get_thread(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(thread_id): Path<MessageId>,
) -> Result<impl IntoResponse, ApiError> {
    let thread = state
        .get_thread_handler()
        .handle(GetThreadQuery {
            thread_id,
            member_id: user.id,
        })
        .await?;
    Ok(Json(thread))
}

async fn update(
    state: AppState,
    message_id: MessageId,
    member_id: MemberId,
    action: MessageAction,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .update_message_handler()
        .handle(UpdateMessageCommand {
            message_id,
            member_id,
            action,
        })
        .await?;
    Ok(Json(message))
}

/// POST /api/messages/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(message_id): Path<MessageId>,
) -> Result<impl IntoResponse, ApiError> {
    update(state, message_id, user.id, MessageAction::MarkRead).await
}

/// POST /api/messages/:id/archive
pub async fn archive(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(message_id): Path<MessageId>,
) -> Result<impl IntoResponse, ApiError> {
    update(state, message_id, user.id, MessageAction::Archive).await
}
