//! Administrative chat endpoints for the operator dashboard.
//!
//! Endpoints:
//! - GET  /api/chats                     - List sessions, newest first
//! - GET  /api/chats/{chat_id}/messages  - Full transcript, oldest first
//! - POST /api/chats/{chat_id}/close     - Close a session

use axum::Json;
use axum::extract::{Path, State};

use nebula_types::chat::{ChatMessage, ChatSession};
use nebula_types::event::{ChatClosed, ServerEvent};

use crate::http::error::AppError;
use crate::http::rooms::{OPERATORS_GROUP, chat_group};
use crate::state::AppState;

/// GET /api/chats - List sessions for the operator dashboard.
pub async fn list_chats(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatSession>>, AppError> {
    let sessions = state.sessions.list_sessions().await?;
    Ok(Json(sessions))
}

/// GET /api/chats/{chat_id}/messages - Transcript in chronological order.
///
/// An unknown chat id yields an empty array, not a 404: the dashboard polls
/// transcripts for chats it learns about over the socket, and a session row
/// may not exist yet.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let messages = state.sessions.transcript(&chat_id).await?;
    Ok(Json(messages))
}

/// POST /api/chats/{chat_id}/close - Close a session (operator action).
///
/// Notifies the chat's own group and the operator group, then returns the
/// closed session. 404 when no session exists for the chat id.
pub async fn close_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatSession>, AppError> {
    let lock = state.chat_locks.acquire(&chat_id);
    let _guard = lock.lock().await;

    let session = state.sessions.close(&chat_id).await?;

    let event = ServerEvent::Closed(ChatClosed {
        chat_id: chat_id.clone(),
    });
    state.rooms.broadcast(&chat_group(&chat_id), &event);
    state.rooms.broadcast(OPERATORS_GROUP, &event);

    tracing::info!(%chat_id, "chat closed by operator");

    Ok(Json(session))
}

/// GET /health - Simple health check endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
