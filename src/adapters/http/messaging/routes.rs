//! Axum routes for direct messages.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{archive, get_thread, list_messages, mark_read, send_message, unread_count};

/// Mounted at `/api/messages`.
///
/// - `GET|POST /` - Folder listing / send
/// - `GET /unread-count` - Unread inbox messages
/// - `GET /threads/:id` - Whole thread, oldest first
/// - `POST /:id/read` - Recipient marks read
/// - `POST /:id/archive` - Recipient archives
pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_messages).post(send_message))
        .route("/unread-count", get(unread_count))
        .route("/threads/:id", get(get_thread))
        .route("/:id/read", post(mark_read))
        .route("/:id/archive", post(archive))
}
