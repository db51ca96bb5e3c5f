//! WebSocket endpoint
//!
//! Server → client only. Client frames other than close are ignored.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};

use crate::registry::NotificationRelay;

/// Router exposing `GET /ws`
pub fn relay_router(relay: Arc<NotificationRelay>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(relay)
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(relay): State<Arc<NotificationRelay>>,
) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, relay))
}

async fn run_session(mut socket: WebSocket, relay: Arc<NotificationRelay>) {
    let mut subscription = relay.subscribe();
    let connection_id = subscription.id();
    tracing::info!(%connection_id, "Relay client connected");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(error = %e, event = event.name(), "Relay event serialization failed");
                        continue;
                    }
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    drop(subscription);
    tracing::info!(%connection_id, "Relay client disconnected");
}
