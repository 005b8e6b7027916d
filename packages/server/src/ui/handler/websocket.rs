//! WebSocket connection handlers.
//!
//! Adapts axum's websocket transport to the gateway: one task per connection
//! while authenticating, then a reader task and a writer task once active.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, PresenceGate, ServerEvent},
    infrastructure::dto::websocket::{ClientFrame, ServerFrame},
    ui::{handshake::extract_credential, state::AppState},
    usecase::{ConnectionHandle, Gateway, GatewayError},
};

/// Query parameters of the upgrade request
#[derive(Debug, Deserialize)]
pub struct HandshakeQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HandshakeQuery>,
) -> impl IntoResponse {
    let credential = extract_credential(&headers, query.token.as_deref());
    ws.on_upgrade(move |socket| handle_socket(socket, state, credential))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, credential: Option<String>) {
    let connection_id = ConnectionId::generate();
    let (mut sender, receiver) = socket.split();

    let connection = match state.gateway.open(connection_id, credential) {
        Ok(connection) => connection,
        Err(_) => {
            // rejected handshakes get a bare close frame
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let Some(receiver) = authenticate(&state.gateway, &connection, tx, &mut sender, receiver).await
    else {
        return;
    };

    let mut send_task = pusher_loop(rx, sender, connection.id().clone());

    let recv_state = state.clone();
    let recv_connection = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut receiver = receiver;
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    dispatch_text(&recv_state.gateway, &recv_connection, text.as_str()).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(
                        "Ignoring binary frame from connection '{}'",
                        recv_connection.id()
                    );
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Connection '{}' requested close", recv_connection.id());
                    break;
                }
                // ping/pong is answered by the transport
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", recv_connection.id(), e);
                    break;
                }
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.gateway.close(&connection).await;
}

/// Run authentication while watching the socket for an early close.
///
/// Returns the socket's read half when the connection became active, `None`
/// when the session is over.
async fn authenticate(
    gateway: &Gateway,
    connection: &ConnectionHandle,
    tx: mpsc::UnboundedSender<ServerEvent>,
    sender: &mut SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
) -> Option<SplitStream<WebSocket>> {
    let outcome = {
        let auth = gateway.authenticate(connection, tx);
        tokio::pin!(auth);
        loop {
            tokio::select! {
                result = &mut auth => break Some(result),
                frame = receiver.next() => match frame {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break None,
                    Some(Ok(_)) => tracing::debug!(
                        "Dropping frame from '{}' received before authentication",
                        connection.id()
                    ),
                },
            }
        }
        // the pending verification is dropped here, before close() takes the
        // connection lock
    };

    match outcome {
        Some(Ok(_)) => Some(receiver),
        Some(Err(GatewayError::Auth(_))) => {
            let _ = sender.send(Message::Close(None)).await;
            None
        }
        Some(Err(e)) => {
            tracing::error!("Failed to activate connection '{}': {}", connection.id(), e);
            let _ = sender.send(Message::Close(None)).await;
            gateway.close(connection).await;
            None
        }
        None => {
            tracing::info!(
                "Connection '{}' closed during authentication",
                connection.id()
            );
            gateway.close(connection).await;
            None
        }
    }
}

async fn dispatch_text(gateway: &Gateway, connection: &ConnectionHandle, text: &str) {
    let event = match ClientFrame::decode(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropping frame from '{}': {}", connection.id(), e);
            return;
        }
    };

    match gateway.handle_event(connection, event).await {
        Ok(report) => tracing::debug!(
            "Message from '{}' delivered to {} peers",
            connection.id(),
            report.delivered
        ),
        Err(e) => tracing::warn!("Dropping message from '{}': {}", connection.id(), e),
    }
}

/// Spawns a task that drains the connection's outbound channel into the
/// WebSocket sender.
///
/// Presence events pass through a `PresenceGate`, so a stale snapshot that
/// lost a race is never written after a newer one.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
    mut sender: SplitSink<WebSocket, Message>,
    connection_id: ConnectionId,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut gate = PresenceGate::new();
        while let Some(event) = rx.recv().await {
            if !gate.admit(&event) {
                tracing::debug!("Skipping stale presence for '{}'", connection_id);
                continue;
            }
            let json = match ServerFrame::from(&event).encode() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to encode event for '{}': {}", connection_id, e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to write to '{}': {}", connection_id, e);
                break;
            }
        }
    })
}
