//! ChatRepository trait definition.
//!
//! Durable CRUD for chat sessions and their message transcripts.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use chrono::{DateTime, Utc};
use nebula_types::chat::{ChatMessage, ChatSession};
use nebula_types::error::RepositoryError;

/// Repository trait for chat session and message persistence.
///
/// Implementations live in nebula-infra (e.g., `SqliteChatRepository`).
/// Messages are append-only: there is no update or delete operation.
pub trait ChatRepository: Send + Sync {
    /// Create a new chat session. Fails with `Conflict` when a session with
    /// the same chat id already exists.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Look up a session by its chat id.
    fn find_session(
        &self,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List sessions ordered by created_at DESC, bounded by `limit`.
    fn list_sessions(
        &self,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Transition a session to CLOSED, recording `closed_at`.
    /// Fails with `NotFound` when the chat id has no session.
    fn close_session(
        &self,
        chat_id: &str,
        closed_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Transition a session back to OPEN, clearing `closed_at`.
    /// Fails with `NotFound` when the chat id has no session.
    fn reopen_session(
        &self,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a new message record. Always inserts; never read-modify-write.
    fn append_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Messages for a chat, ascending by `at` (ties broken by id), bounded
    /// by `limit` -- the earliest `limit` messages.
    fn list_messages(
        &self,
        chat_id: &str,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
