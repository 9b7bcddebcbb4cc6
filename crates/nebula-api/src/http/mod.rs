//! HTTP and WebSocket layer for the support chat.
//!
//! Axum-based REST surface at `/api/` plus the `/ws` realtime endpoint,
//! with CORS support and request tracing.

pub mod error;
pub mod handlers;
pub mod rooms;
pub mod router;
