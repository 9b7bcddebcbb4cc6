//! Wire-level event types for the realtime transport.
//!
//! Frames are JSON text in an adjacently tagged envelope:
//! `{"event": "chat:message", "data": { ... }}`. Payload fields use
//! camelCase to match the dashboard and widget clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, MessageKind, Sender};

/// Inbound message payload from a visitor or operator client.
///
/// Only `chat_id` and `text` are required; `from` defaults to the visitor,
/// `kind` to plain text, and `at` to receipt time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub chat_id: String,
    pub text: String,
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default)]
    pub kind: Option<MessageKind>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

/// Payload of a `chat:join` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatJoin {
    pub chat_id: String,
}

/// Payload of a `chat:closed` broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatClosed {
    pub chat_id: String,
}

/// Incoming event from a connected client.
///
/// Unknown or malformed frames are logged and ignored by the router.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Join the shared operator broadcast group.
    #[serde(rename = "operator:join")]
    OperatorJoin,
    /// Join a chat group and receive its transcript.
    #[serde(rename = "chat:join")]
    ChatJoin(ChatJoin),
    /// Submit a message to a chat.
    #[serde(rename = "chat:message")]
    ChatMessage(IncomingMessage),
}

/// Outgoing event pushed to connected clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Transcript sent privately to a connection that just joined a chat.
    #[serde(rename = "chat:history")]
    History(Vec<ChatMessage>),
    /// A persisted message, broadcast to the chat group.
    #[serde(rename = "chat:message")]
    Message(ChatMessage),
    /// A session was closed by an operator, broadcast to the chat group
    /// and the operator group.
    #[serde(rename = "chat:closed")]
    Closed(ChatClosed),
}
