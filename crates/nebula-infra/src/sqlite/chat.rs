//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `nebula-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool, writes on the writer pool.

use chrono::{DateTime, Utc};
use nebula_core::chat::repository::ChatRepository;
use nebula_types::chat::{ChatMessage, ChatSession};
use nebula_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    chat_id: String,
    status: String,
    created_at: String,
    closed_at: Option<String>,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            closed_at: row.try_get("closed_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let status = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;
        let closed_at = self.closed_at.as_deref().map(parse_datetime).transpose()?;

        Ok(ChatSession {
            chat_id: self.chat_id,
            status,
            created_at,
            closed_at,
        })
    }
}

struct ChatMessageRow {
    id: String,
    chat_id: String,
    sender: String,
    kind: String,
    body: String,
    url: Option<String>,
    at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            sender: row.try_get("sender")?,
            kind: row.try_get("kind")?,
            body: row.try_get("body")?,
            url: row.try_get("url")?,
            at: row.try_get("at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let from = self
            .sender
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let kind = self
            .kind
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let at = parse_datetime(&self.at)?;

        Ok(ChatMessage {
            id,
            chat_id: self.chat_id,
            from,
            kind,
            text: self.body,
            url: self.url,
            at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn map_insert_error(e: sqlx::Error, chat_id: &str) -> RepositoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("chat '{chat_id}' already exists"));
        }
    }
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (chat_id, status, created_at, closed_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(&session.chat_id)
        .bind(session.status.to_string())
        .bind(format_datetime(&session.created_at))
        .bind(session.closed_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| map_insert_error(e, &session.chat_id))?;

        Ok(())
    }

    async fn find_session(&self, chat_id: &str) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn list_sessions(&self, limit: i64) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM chat_sessions ORDER BY created_at DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row = ChatSessionRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn close_session(
        &self,
        chat_id: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE chat_sessions SET status = 'closed', closed_at = ? WHERE chat_id = ?",
        )
        .bind(format_datetime(&closed_at))
        .bind(chat_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn reopen_session(&self, chat_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE chat_sessions SET status = 'open', closed_at = NULL WHERE chat_id = ?",
        )
        .bind(chat_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_messages (id, chat_id, sender, kind, body, url, at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(&message.chat_id)
        .bind(message.from.to_string())
        .bind(message.kind.to_string())
        .bind(&message.text)
        .bind(&message.url)
        .bind(format_datetime(&message.at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_messages(
        &self,
        chat_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE chat_id = ? ORDER BY at ASC, id ASC LIMIT ?",
        )
        .bind(chat_id)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }
}
