//! Shared domain types for the Nebula support chat engine.
//!
//! This crate contains the core domain types used across the support chat
//! service: chat sessions, messages, transport event payloads, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod error;
pub mod event;
