//! Conversation lifecycle manager.
//!
//! Owns the open/closed state of chat sessions: find-or-create on first
//! contact, welcome synthesis for empty transcripts, reopen-on-activity for
//! closed sessions, and operator-driven close. Generic over [`ChatRepository`]
//! so the transport layer and tests can supply different stores.

use chrono::Utc;
use nebula_types::chat::{ChatMessage, ChatSession, MessageKind, Sender, SessionStatus};
use nebula_types::error::RepositoryError;
use nebula_types::event::IncomingMessage;
use uuid::Uuid;

use super::repository::ChatRepository;
use super::responder::ResponderAction;

/// Transcript bound when a connection joins a chat.
pub const JOIN_HISTORY_LIMIT: i64 = 500;
/// Transcript bound for the full-transcript admin endpoint.
pub const TRANSCRIPT_LIMIT: i64 = 1000;
/// Bound for the admin session list.
pub const SESSION_LIST_LIMIT: i64 = 200;

/// Greeting persisted into every empty transcript on first join.
pub const WELCOME_TEXT: &str = "Привет! Я ИИ-помощник Nebula. Как могу помочь?\n\n\
    Возможные темы:\n\
    • Подписка и оплата\n\
    • Скачивание приложения\n\
    • Вакансии\n\
    • Проблемы со стримами\n\
    • Общие вопросы\n\n\
    Опишите вашу проблему!";

/// Greeting persisted when a visitor resumes a conversation an operator
/// had closed.
pub const REOPENED_TEXT: &str = "Привет! Диалог был закрыт оператором, но я готов помочь \
    снова. Что вас беспокоит?\n\n\
    Возможные темы:\n\
    • Подписка и оплата (доступно в РФ, скоро международный запуск)\n\
    • Скачивание приложения\n\
    • Вакансии и резюме\n\
    • Проблемы со стримами\n\
    • Общие вопросы о Nebula\n\n\
    Опишите проблему подробнее!";

/// Result of accepting an inbound message.
///
/// `reopened` is present when the session was CLOSED and this message
/// reopened it; it is persisted (and must be broadcast) immediately after
/// `message`.
#[derive(Debug)]
pub struct IncomingOutcome {
    pub message: ChatMessage,
    pub reopened: Option<ChatMessage>,
}

/// Lifecycle manager for chat sessions.
pub struct SessionService<R: ChatRepository> {
    repo: R,
}

impl<R: ChatRepository> SessionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Handle a connection joining a chat.
    ///
    /// Find-or-creates the session and returns its transcript. An empty
    /// transcript gets exactly one AUTOMATED welcome message persisted
    /// first, so every chat has a non-empty transcript once joined.
    pub async fn join(&self, chat_id: &str) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.find_or_create(chat_id).await?;

        let mut history = self.repo.list_messages(chat_id, JOIN_HISTORY_LIMIT).await?;
        if history.is_empty() {
            let welcome = ChatMessage::automated(chat_id, WELCOME_TEXT);
            self.repo.append_message(&welcome).await?;
            tracing::debug!(%chat_id, "synthesized welcome for new chat");
            history.push(welcome);
        }

        Ok(history)
    }

    /// Accept and persist an inbound visitor/operator message.
    ///
    /// A CLOSED session transitions back to OPEN and gets a distinct
    /// AUTOMATED reopened-greeting persisted right after the triggering
    /// message.
    pub async fn handle_incoming(
        &self,
        incoming: IncomingMessage,
    ) -> Result<IncomingOutcome, RepositoryError> {
        let session = self.find_or_create(&incoming.chat_id).await?;
        let was_closed = session.status == SessionStatus::Closed;

        let message = ChatMessage {
            id: Uuid::now_v7(),
            chat_id: incoming.chat_id.clone(),
            from: incoming.from.unwrap_or(Sender::Visitor),
            kind: incoming.kind.unwrap_or(MessageKind::Text),
            text: incoming.text,
            url: incoming.url,
            at: incoming.at.unwrap_or_else(Utc::now),
        };
        self.repo.append_message(&message).await?;

        let reopened = if was_closed {
            self.repo.reopen_session(&incoming.chat_id).await?;
            tracing::info!(chat_id = %incoming.chat_id, "closed chat reopened by activity");
            let greeting = ChatMessage::automated(&incoming.chat_id, REOPENED_TEXT);
            self.repo.append_message(&greeting).await?;
            Some(greeting)
        } else {
            None
        };

        Ok(IncomingOutcome { message, reopened })
    }

    /// Persist a responder action as an AUTOMATED message.
    pub async fn respond(
        &self,
        chat_id: &str,
        action: ResponderAction,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = match action {
            ResponderAction::Reply(text) => ChatMessage::automated(chat_id, &text),
            ResponderAction::Link { label, url } => {
                ChatMessage::automated_link(chat_id, &label, &url)
            }
        };
        self.repo.append_message(&message).await?;
        Ok(message)
    }

    /// Close a session (operator action). `NotFound` when the chat id has
    /// no session.
    pub async fn close(&self, chat_id: &str) -> Result<ChatSession, RepositoryError> {
        self.repo.close_session(chat_id, Utc::now()).await?;
        self.repo
            .find_session(chat_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Sessions for the operator dashboard, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<ChatSession>, RepositoryError> {
        self.repo.list_sessions(SESSION_LIST_LIMIT).await
    }

    /// Full bounded transcript for the admin surface, ascending order.
    pub async fn transcript(&self, chat_id: &str) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.repo.list_messages(chat_id, TRANSCRIPT_LIMIT).await
    }

    /// Find-or-create: duplicate creation is absorbed, never an error.
    async fn find_or_create(&self, chat_id: &str) -> Result<ChatSession, RepositoryError> {
        if let Some(existing) = self.repo.find_session(chat_id).await? {
            return Ok(existing);
        }

        let session = ChatSession::open(chat_id);
        match self.repo.create_session(&session).await {
            Ok(()) => Ok(session),
            // Lost a creation race: another handler inserted the row first.
            Err(RepositoryError::Conflict(_)) => self
                .repo
                .find_session(chat_id)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in for the SQLite store.
    #[derive(Default)]
    struct MemoryRepo {
        sessions: Mutex<HashMap<String, ChatSession>>,
        messages: Mutex<Vec<ChatMessage>>,
    }

    impl ChatRepository for MemoryRepo {
        async fn create_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            if sessions.contains_key(&session.chat_id) {
                return Err(RepositoryError::Conflict(session.chat_id.clone()));
            }
            sessions.insert(session.chat_id.clone(), session.clone());
            Ok(())
        }

        async fn find_session(
            &self,
            chat_id: &str,
        ) -> Result<Option<ChatSession>, RepositoryError> {
            Ok(self.sessions.lock().unwrap().get(chat_id).cloned())
        }

        async fn list_sessions(&self, limit: i64) -> Result<Vec<ChatSession>, RepositoryError> {
            let mut list: Vec<_> = self.sessions.lock().unwrap().values().cloned().collect();
            list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            list.truncate(limit as usize);
            Ok(list)
        }

        async fn close_session(
            &self,
            chat_id: &str,
            closed_at: chrono::DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions.get_mut(chat_id).ok_or(RepositoryError::NotFound)?;
            session.status = SessionStatus::Closed;
            session.closed_at = Some(closed_at);
            Ok(())
        }

        async fn reopen_session(&self, chat_id: &str) -> Result<(), RepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions.get_mut(chat_id).ok_or(RepositoryError::NotFound)?;
            session.status = SessionStatus::Open;
            session.closed_at = None;
            Ok(())
        }

        async fn append_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn list_messages(
            &self,
            chat_id: &str,
            limit: i64,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            let messages = self.messages.lock().unwrap();
            Ok(messages
                .iter()
                .filter(|m| m.chat_id == chat_id)
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    fn service() -> SessionService<MemoryRepo> {
        SessionService::new(MemoryRepo::default())
    }

    fn incoming(chat_id: &str, text: &str) -> IncomingMessage {
        IncomingMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            from: None,
            kind: None,
            url: None,
            at: None,
        }
    }

    #[tokio::test]
    async fn first_join_synthesizes_exactly_one_welcome() {
        let svc = service();

        let history = svc.join("abc").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from, Sender::Automated);
        assert_eq!(history[0].text, WELCOME_TEXT);

        // Re-joining a non-empty chat must not add a second welcome.
        let history = svc.join("abc").await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn join_creates_an_open_session() {
        let svc = service();
        svc.join("abc").await.unwrap();

        let session = svc.repo.find_session("abc").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Open);
    }

    #[tokio::test]
    async fn incoming_message_defaults_to_visitor_text() {
        let svc = service();
        let outcome = svc.handle_incoming(incoming("abc", "hello")).await.unwrap();

        assert_eq!(outcome.message.from, Sender::Visitor);
        assert_eq!(outcome.message.kind, MessageKind::Text);
        assert!(outcome.reopened.is_none());
    }

    #[tokio::test]
    async fn incoming_message_reopens_closed_session() {
        let svc = service();
        svc.handle_incoming(incoming("abc", "first")).await.unwrap();
        svc.close("abc").await.unwrap();

        let outcome = svc.handle_incoming(incoming("abc", "again")).await.unwrap();

        // Session is OPEN again with closed_at cleared.
        let session = svc.repo.find_session("abc").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Open);
        assert!(session.closed_at.is_none());

        // Exactly one reopened greeting, persisted after the trigger message.
        let greeting = outcome.reopened.expect("reopened greeting");
        assert_eq!(greeting.text, REOPENED_TEXT);
        let transcript = svc.transcript("abc").await.unwrap();
        let last_two: Vec<_> = transcript.iter().rev().take(2).collect();
        assert_eq!(last_two[0].text, REOPENED_TEXT);
        assert_eq!(last_two[1].text, "again");
    }

    #[tokio::test]
    async fn message_to_open_session_does_not_reopen() {
        let svc = service();
        svc.handle_incoming(incoming("abc", "one")).await.unwrap();
        let outcome = svc.handle_incoming(incoming("abc", "two")).await.unwrap();
        assert!(outcome.reopened.is_none());
    }

    #[tokio::test]
    async fn close_sets_status_and_timestamp() {
        let svc = service();
        svc.join("abc").await.unwrap();

        let session = svc.close("abc").await.unwrap();
        assert_eq!(session.status, SessionStatus::Closed);
        assert!(session.closed_at.is_some());
    }

    #[tokio::test]
    async fn close_unknown_chat_is_not_found() {
        let svc = service();
        let err = svc.close("ghost").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn respond_persists_link_action() {
        let svc = service();
        svc.join("abc").await.unwrap();

        let reply = svc
            .respond(
                "abc",
                ResponderAction::Link {
                    label: "Downloads".to_string(),
                    url: "/download".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(reply.from, Sender::Automated);
        assert_eq!(reply.kind, MessageKind::Link);
        assert_eq!(reply.url.as_deref(), Some("/download"));
        assert_eq!(svc.transcript("abc").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_creation_is_absorbed() {
        let svc = service();
        // Pre-create the session, then join: find-or-create must absorb it.
        svc.repo
            .create_session(&ChatSession::open("abc"))
            .await
            .unwrap();
        let history = svc.join("abc").await.unwrap();
        assert_eq!(history.len(), 1);
    }
}
