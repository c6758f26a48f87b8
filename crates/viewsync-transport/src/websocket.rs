//! WebSocket transport for map viewers.

use std::time::Duration;

use axum::{
    Json,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;
use viewsync_session::{HubStatus, SessionHub};

use crate::protocol::{ClientMessage, ServerMessage};

/// WebSocket handler state.
#[derive(Clone)]
pub struct WsState {
    /// The shared session.
    pub hub: SessionHub,
    /// Disconnect connections that stay silent this long.
    pub idle_timeout: Option<Duration>,
}

impl WsState {
    /// Create new WebSocket state.
    #[must_use]
    pub const fn new(hub: SessionHub) -> Self {
        Self {
            hub,
            idle_timeout: None,
        }
    }

    /// Set the idle timeout. `None` waits forever.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

/// WebSocket upgrade handler.
///
/// Use this as an Axum route handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Session status handler.
pub async fn status_handler(State(state): State<WsState>) -> Json<HubStatus> {
    Json(state.hub.status())
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = Uuid::new_v4();

    let mut outbound = match state.hub.register(connection_id) {
        Ok(rx) => rx,
        Err(e) => {
            tracing::error!("Failed to register connection {connection_id}: {e}");
            return;
        }
    };

    // The welcome goes out before anything the hub queued for us.
    let welcome = ServerMessage::Welcome { connection_id };
    if !send_json(&mut sender, &welcome).await {
        state.hub.unregister(connection_id);
        return;
    }

    // Replies that only concern this connection (pong, errors)
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Spawn task to forward messages to WebSocket
    let send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                Some(out) = outbound.recv() => ServerMessage::from(out),
                Some(reply) = rx.recv() => reply,
                else => break,
            };
            if !send_json(&mut sender, &msg).await {
                break;
            }
        }
    });

    // Handle incoming messages
    loop {
        let next = match state.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, receiver.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!("Connection {connection_id} idle for {limit:?}, dropping");
                    break;
                }
            },
            None => receiver.next().await,
        };
        let Some(msg) = next else { break };

        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s.into(),
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {e}");
                break;
            }
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Invalid client message from {connection_id}: {e}");
                let _ = tx.send(ServerMessage::Error {
                    message: format!("Invalid message: {e}"),
                });
                continue;
            }
        };

        match client_msg.into_inbound() {
            Some(event) => state.hub.handle(connection_id, event),
            None => {
                let _ = tx.send(ServerMessage::Pong);
            }
        }
    }

    state.hub.unregister(connection_id);
    send_task.abort();
    tracing::info!("WebSocket {connection_id} disconnected");
}

/// Serialize and send one message. Returns `false` once the socket is gone.
async fn send_json<S>(sink: &mut S, msg: &ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(msg) {
        Ok(j) => j,
        Err(e) => {
            tracing::error!("Failed to serialize message: {e}");
            return true;
        }
    };
    sink.send(Message::Text(json.into())).await.is_ok()
}

/// Create the session router: `/ws` for viewers, `/status` for monitoring.
///
/// # Example
/// ```ignore
/// let app = create_ws_router(WsState::new(SessionHub::default()))
///     .layer(CorsLayer::permissive());
/// ```
#[must_use]
pub fn create_ws_router(state: WsState) -> axum::Router {
    axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .route("/status", axum::routing::get(status_handler))
        .with_state(state)
}
