//! Per-client WebSocket session.
//!
//! # Responsibilities
//! - Complete the upgrade handshake and register with the hub
//! - Forward hub events to the socket as JSON text frames
//! - Deregister on client disconnect or hub close directive
//!
//! # Design Decisions
//! - Inbound frames are ignored: the hub is a notification channel, not an
//!   RPC surface; ping/pong is handled by the protocol layer
//! - Close frames are propagated in both directions

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::Arc;

use crate::http::server::AppState;
use crate::messaging::hub::{HubMessage, MessagingHub};

/// Handler for the WebSocket endpoint.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(state.hub.clone(), socket))
}

async fn run_session(hub: Arc<MessagingHub>, socket: WebSocket) {
    let Some((id, mut rx)) = hub.register() else {
        // Hub not accepting sessions (starting up or shutting down).
        let mut socket = socket;
        let _ = socket.send(Message::Close(None)).await;
        return;
    };
    tracing::debug!(client = %id, "messaging client connected");

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            directive = rx.recv() => match directive {
                Some(HubMessage::Event { name, data }) => {
                    let frame = json!({"event": name, "data": data}).to_string();
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Some(HubMessage::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    hub.deregister(id);
    tracing::debug!(client = %id, "messaging client disconnected");
}
