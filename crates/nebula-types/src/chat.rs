//! Chat session and message types for the Nebula support chat.
//!
//! A session is one logical conversation thread, identified by a
//! caller-supplied `chat_id` string. Messages are immutable, ordered by
//! timestamp within a session, and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a chat session.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (status IN ('open', 'closed'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Open => write!(f, "open"),
            SessionStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(SessionStatus::Open),
            "closed" => Ok(SessionStatus::Closed),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Open
    }
}

/// Who authored a message: the visitor, a human operator, or the
/// rule-based responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Visitor,
    Operator,
    Automated,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::Visitor => write!(f, "visitor"),
            Sender::Operator => write!(f, "operator"),
            Sender::Automated => write!(f, "automated"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visitor" => Ok(Sender::Visitor),
            "operator" => Ok(Sender::Operator),
            "automated" => Ok(Sender::Automated),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// Message payload kind: plain text, or a navigation link whose `text` is
/// the link label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Link,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Link => write!(f, "link"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "link" => Ok(MessageKind::Link),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Text
    }
}

/// One conversation thread.
///
/// Created lazily on first contact with a previously-unseen `chat_id`;
/// cycles between open and closed indefinitely, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub chat_id: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    /// A freshly-created session in the initial OPEN state.
    pub fn open(chat_id: &str) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            status: SessionStatus::Open,
            created_at: Utc::now(),
            closed_at: None,
        }
    }
}

/// A single message within a chat session.
///
/// Messages are ordered by `at` within a session, ties broken by `id`
/// (UUIDv7 is time-sortable, so id order matches insertion order).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: String,
    pub from: Sender,
    pub kind: MessageKind,
    /// Message body; for `kind == Link` this is the link label.
    pub text: String,
    /// Internal navigation path, present only when `kind == Link`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    /// Synthesize an automated plain-text message (greetings, canned replies).
    pub fn automated(chat_id: &str, text: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            chat_id: chat_id.to_string(),
            from: Sender::Automated,
            kind: MessageKind::Text,
            text: text.to_string(),
            url: None,
            at: Utc::now(),
        }
    }

    /// Synthesize an automated navigation-link message.
    pub fn automated_link(chat_id: &str, label: &str, url: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            chat_id: chat_id.to_string(),
            from: Sender::Automated,
            kind: MessageKind::Link,
            text: label.to_string(),
            url: Some(url.to_string()),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_status_round_trips_through_strings() {
        for status in [SessionStatus::Open, SessionStatus::Closed] {
            let parsed: SessionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("archived".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn sender_round_trips_through_strings() {
        for sender in [Sender::Visitor, Sender::Operator, Sender::Automated] {
            let parsed: Sender = sender.to_string().parse().unwrap();
            assert_eq!(parsed, sender);
        }
        assert!("bot".parse::<Sender>().is_err());
    }

    #[test]
    fn message_serializes_with_camel_case_fields() {
        let msg = ChatMessage::automated("abc", "hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["chatId"], "abc");
        assert_eq!(value["from"], "automated");
        assert_eq!(value["kind"], "text");
        // No url on a text message.
        assert!(value.get("url").is_none());
    }

    #[test]
    fn link_message_carries_label_and_url() {
        let msg = ChatMessage::automated_link("abc", "Downloads", "/download");
        assert_eq!(msg.kind, MessageKind::Link);
        assert_eq!(msg.text, "Downloads");
        assert_eq!(msg.url.as_deref(), Some("/download"));
    }

    #[test]
    fn new_session_starts_open_without_closed_at() {
        let session = ChatSession::open("abc");
        assert_eq!(session.status, SessionStatus::Open);
        assert!(session.closed_at.is_none());
    }
}
