//! Infrastructure layer for the Nebula support chat.
//!
//! Contains the SQLite implementation of the `ChatRepository` trait defined
//! in `nebula-core`.

pub mod sqlite;
