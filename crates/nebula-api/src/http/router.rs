//! Axum router configuration with middleware.
//!
//! REST routes live under `/api/`; the realtime endpoint is `/ws`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::chat::health))
        .route("/api/chats", get(handlers::chat::list_chats))
        .route(
            "/api/chats/{chat_id}/messages",
            get(handlers::chat::get_messages),
        )
        .route(
            "/api/chats/{chat_id}/close",
            post(handlers::chat::close_chat),
        )
        .route("/ws", get(handlers::ws::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
