//! SQLite-backed persistence: connection pool and chat repository.

pub mod chat;
pub mod pool;
