//! Application state wiring the session service to its SQLite store.
//!
//! The service is generic over the repository trait; AppState pins it to the
//! concrete SQLite implementation and adds the connection registries the
//! realtime router needs.

use std::sync::Arc;

use nebula_core::chat::lifecycle::SessionService;
use nebula_infra::sqlite::chat::SqliteChatRepository;
use nebula_infra::sqlite::pool::DatabasePool;

use crate::http::rooms::{ChatLocks, RoomRegistry};

/// Concrete type alias for the service generic pinned to the SQLite store.
pub type ConcreteSessionService = SessionService<SqliteChatRepository>;

/// Shared application state used by HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<ConcreteSessionService>,
    pub rooms: Arc<RoomRegistry>,
    pub chat_locks: Arc<ChatLocks>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the DB, wire the service.
    pub async fn init(database_url: &str) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(database_url).await?;

        let repo = SqliteChatRepository::new(db_pool.clone());
        let sessions = SessionService::new(repo);

        Ok(Self {
            sessions: Arc::new(sessions),
            rooms: Arc::new(RoomRegistry::default()),
            chat_locks: Arc::new(ChatLocks::default()),
            db_pool,
        })
    }
}
