//! The `/ws` endpoint: one task per client connection.
//!
//! The task owns both halves of the socket. Outbound frames from the core
//! arrive on the connection's channel and are written to the socket;
//! inbound text frames are decoded into client events and fed to the
//! session. Whichever way the connection ends, the disconnect transition
//! runs exactly once.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use courier_presence::{connection_channel, ClientEvent, EventError, Frame, ServerEvent, Session};

use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct WebSocketQuery {
    token: Option<String>,
}

/// WebSocket connection handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WebSocketQuery>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn handle_socket(socket: WebSocket, state: Arc<GatewayState>, token: Option<String>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (connection, mut outbound) = connection_channel();

    let mut session = match Session::connect(
        state.registry.clone(),
        state.directory.clone(),
        state.history.clone(),
        &state.verifier,
        token.as_deref(),
        connection,
    )
    .await
    {
        Ok(session) => session,
        Err(err) => {
            // one error event, then close; no retry
            warn!(error = %err, "websocket authentication failed");
            let event = ServerEvent::Error(err.to_string());
            if let Ok(text) = serde_json::to_string(&event) {
                let _ = ws_tx.send(Message::Text(text)).await;
            }
            let _ = ws_tx.send(Message::Close(None)).await;
            return;
        }
    };

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(Frame::Event(event)) => match serde_json::to_string(&event) {
                    Ok(text) => {
                        if ws_tx.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(error = %err, "failed to encode server event"),
                },
                // replaced by a newer connection for the same handle
                Some(Frame::Close) | None => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            },
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        if let Err(err) = session.handle_event(event).await {
                            session.emit_error(&err);
                        }
                    }
                    Err(_) => session.emit_error(&EventError::Validation),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // ping/pong are answered by axum itself
                Some(Err(err)) => {
                    debug!(error = %err, "websocket receive error");
                    break;
                }
            },
        }
    }

    session.disconnect().await;
}
