//! Connection groups and per-chat serialization for the realtime router.
//!
//! Each WebSocket connection owns an unbounded outbound queue; the registry
//! maps group names to the queues of their members. Broadcasting clones the
//! event into every member's queue, including the sender's own connection
//! when it is a member of the group.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

use nebula_types::event::ServerEvent;

/// Broadcast group every operator dashboard connection joins.
pub const OPERATORS_GROUP: &str = "operators";

/// Per-connection identifier, unique for the process lifetime.
pub type ConnId = u64;

/// Group name for a chat's broadcast group.
pub fn chat_group(chat_id: &str) -> String {
    format!("chat:{chat_id}")
}

/// Registry of connection groups.
///
/// A connection may be a member of any number of groups (a dashboard joins
/// the operator group plus every chat it has opened). Dropped receivers are
/// tolerated on broadcast and removed on `leave_all`.
#[derive(Default)]
pub struct RoomRegistry {
    groups: DashMap<String, HashMap<ConnId, mpsc::UnboundedSender<ServerEvent>>>,
    next_conn_id: AtomicU64,
}

impl RoomRegistry {
    /// Allocate an identifier for a new connection.
    pub fn next_conn_id(&self) -> ConnId {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Add a connection's outbound queue to a group. Re-joining a group the
    /// connection is already in replaces the queue and is harmless.
    pub fn join(&self, group: &str, conn_id: ConnId, tx: mpsc::UnboundedSender<ServerEvent>) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(conn_id, tx);
    }

    /// Remove a connection from every group it joined. Empty groups are
    /// dropped so chat groups don't accumulate forever.
    pub fn leave_all(&self, conn_id: ConnId) {
        self.groups.retain(|_, members| {
            members.remove(&conn_id);
            !members.is_empty()
        });
    }

    /// Push an event to every member of a group, the originator included.
    /// Send failures mean the receiver task already exited and are ignored.
    pub fn broadcast(&self, group: &str, event: &ServerEvent) {
        if let Some(members) = self.groups.get(group) {
            for tx in members.values() {
                let _ = tx.send(event.clone());
            }
        }
    }
}

/// Per-chat mutexes serializing message handling.
///
/// Handlers for the same chat run one at a time so the persist-then-broadcast
/// sequence of one message never interleaves with another's. Locks are
/// created on first use and kept for the process lifetime; the set of chat
/// ids a single process sees is small.
#[derive(Default)]
pub struct ChatLocks {
    locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl ChatLocks {
    /// The lock guarding a chat, created on first use.
    pub fn acquire(&self, chat_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .entry(chat_id.to_string())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_types::event::ChatClosed;

    fn closed_event(chat_id: &str) -> ServerEvent {
        ServerEvent::Closed(ChatClosed {
            chat_id: chat_id.to_string(),
        })
    }

    #[tokio::test]
    async fn broadcast_reaches_every_member_including_sender() {
        let rooms = RoomRegistry::default();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        let a = rooms.next_conn_id();
        let b = rooms.next_conn_id();
        rooms.join("chat:abc", a, tx_a);
        rooms.join("chat:abc", b, tx_b);

        rooms.broadcast("chat:abc", &closed_event("abc"));

        assert!(matches!(rx_a.try_recv().unwrap(), ServerEvent::Closed(_)));
        assert!(matches!(rx_b.try_recv().unwrap(), ServerEvent::Closed(_)));
    }

    #[tokio::test]
    async fn broadcast_to_unknown_group_is_a_no_op() {
        let rooms = RoomRegistry::default();
        rooms.broadcast("chat:ghost", &closed_event("ghost"));
    }

    #[tokio::test]
    async fn leave_all_removes_connection_from_every_group() {
        let rooms = RoomRegistry::default();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let conn = rooms.next_conn_id();
        rooms.join(OPERATORS_GROUP, conn, tx.clone());
        rooms.join("chat:abc", conn, tx);

        rooms.leave_all(conn);

        rooms.broadcast(OPERATORS_GROUP, &closed_event("abc"));
        rooms.broadcast("chat:abc", &closed_event("abc"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_break_broadcast() {
        let rooms = RoomRegistry::default();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        drop(rx_dead);

        rooms.join("chat:abc", rooms.next_conn_id(), tx_dead);
        rooms.join("chat:abc", rooms.next_conn_id(), tx_live);

        rooms.broadcast("chat:abc", &closed_event("abc"));
        assert!(rx_live.try_recv().is_ok());
    }

    #[tokio::test]
    async fn chat_locks_hand_out_the_same_mutex_per_chat() {
        let locks = ChatLocks::default();
        let first = locks.acquire("abc");
        let second = locks.acquire("abc");
        assert!(Arc::ptr_eq(&first, &second));

        let other = locks.acquire("xyz");
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
