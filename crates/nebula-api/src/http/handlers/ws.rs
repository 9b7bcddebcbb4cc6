//! WebSocket handler for the realtime support chat.
//!
//! The `/ws` endpoint upgrades an HTTP connection to a WebSocket. Each
//! connection gets an unbounded outbound queue registered with the
//! [`RoomRegistry`]; a dedicated send task drains the queue into the socket
//! while the main task processes inbound frames:
//!
//! - `operator:join` adds the connection to the shared operator group.
//! - `chat:join` adds it to the chat's group and delivers the transcript
//!   privately to this connection only.
//! - `chat:message` persists the message and broadcasts it (and any
//!   reopened-greeting and automated reply) to the chat group.
//!
//! Malformed or unknown frames are logged and ignored; they never close the
//! connection. Work for a given chat runs under that chat's lock so the
//! persist-then-broadcast sequence of one message never interleaves with
//! another's.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use nebula_core::chat::responder;
use nebula_types::chat::Sender;
use nebula_types::event::{ClientEvent, IncomingMessage, ServerEvent};

use crate::http::rooms::{ConnId, OPERATORS_GROUP, chat_group};
use crate::state::AppState;

/// Upgrade an HTTP request to a WebSocket connection.
///
/// This is mounted at `/ws` in the router.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Core WebSocket connection handler.
///
/// Splits the socket: a spawned task serializes queued [`ServerEvent`]s into
/// outbound text frames, the main loop parses inbound frames as
/// [`ClientEvent`]s. Keeping the outbound path in a queue lets broadcasts
/// from other connections reach this socket without sharing the sink.
async fn handle_connection(socket: WebSocket, state: AppState) {
    let conn_id = state.rooms.next_conn_id();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        // Client disconnected
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!("failed to serialize outbound event: {err}");
                }
            }
        }
    });

    tracing::debug!(conn_id, "websocket connected");

    while let Some(msg_result) = ws_receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                let event: ClientEvent = match serde_json::from_str(&text) {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::debug!(
                            conn_id,
                            error = %err,
                            "ignoring malformed frame"
                        );
                        continue;
                    }
                };
                process_event(event, conn_id, &tx, &state).await;
            }
            Ok(Message::Close(_)) => break,
            Err(err) => {
                tracing::debug!(conn_id, "websocket receive error: {err}");
                break;
            }
            // Binary, ping, pong protocol frames are handled by the stack
            Ok(_) => {}
        }
    }

    state.rooms.leave_all(conn_id);
    send_task.abort();
    tracing::debug!(conn_id, "websocket disconnected");
}

/// Dispatch a parsed client event.
async fn process_event(
    event: ClientEvent,
    conn_id: ConnId,
    tx: &mpsc::UnboundedSender<ServerEvent>,
    state: &AppState,
) {
    match event {
        ClientEvent::OperatorJoin => {
            state.rooms.join(OPERATORS_GROUP, conn_id, tx.clone());
            tracing::debug!(conn_id, "operator joined");
        }

        ClientEvent::ChatJoin(payload) => {
            if payload.chat_id.trim().is_empty() {
                tracing::debug!(conn_id, "dropping join with blank chat id");
                return;
            }

            let lock = state.chat_locks.acquire(&payload.chat_id);
            let _guard = lock.lock().await;

            // Membership first, so broadcasts racing with the join are not
            // lost while the transcript loads.
            state
                .rooms
                .join(&chat_group(&payload.chat_id), conn_id, tx.clone());

            match state.sessions.join(&payload.chat_id).await {
                Ok(history) => {
                    // Transcript goes to the joining connection only.
                    let _ = tx.send(ServerEvent::History(history));
                }
                Err(err) => {
                    tracing::error!(
                        chat_id = %payload.chat_id,
                        error = %err,
                        "chat join failed"
                    );
                }
            }
        }

        ClientEvent::ChatMessage(incoming) => {
            handle_message(incoming, state).await;
        }
    }
}

/// Persist an inbound message and fan out everything it produced.
///
/// Broadcast order within the chat group: the message itself, the
/// reopened-greeting when the message revived a closed session, then the
/// automated reply for visitor messages. Blank text or chat id drops the
/// frame without a response.
async fn handle_message(incoming: IncomingMessage, state: &AppState) {
    if incoming.chat_id.trim().is_empty() || incoming.text.trim().is_empty() {
        tracing::debug!("dropping message with blank chat id or text");
        return;
    }

    let lock = state.chat_locks.acquire(&incoming.chat_id);
    let _guard = lock.lock().await;

    let group = chat_group(&incoming.chat_id);
    let chat_id = incoming.chat_id.clone();
    let text = incoming.text.clone();
    let from = incoming.from.unwrap_or(Sender::Visitor);

    let outcome = match state.sessions.handle_incoming(incoming).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(%chat_id, error = %err, "failed to persist message");
            return;
        }
    };

    state
        .rooms
        .broadcast(&group, &ServerEvent::Message(outcome.message));
    if let Some(greeting) = outcome.reopened {
        state
            .rooms
            .broadcast(&group, &ServerEvent::Message(greeting));
    }

    // Only visitor messages get an automated reply; operator traffic is
    // relayed as-is.
    if from == Sender::Visitor {
        let action = responder::respond(&text);
        match state.sessions.respond(&chat_id, action).await {
            Ok(reply) => {
                state.rooms.broadcast(&group, &ServerEvent::Message(reply));
            }
            Err(err) => {
                tracing::error!(%chat_id, error = %err, "failed to persist reply");
            }
        }
    }
}
