use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::api::state::AppState;
use crate::api::types::WsMessage;

/// GET /ws -- live alert stream for the frontend
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before anything can be published for this connection
    let mut rx = state.alerts.subscribe();
    state.metrics.ws_client_connected();

    // Forward alerts to this client. A lagged reader skips what it missed
    // and keeps going; only a closed channel or dead socket ends the task.
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    let envelope = WsMessage::from(notification);
                    let json = match serde_json::to_string(&envelope) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("failed to serialize alert for websocket: {}", e);
                            continue;
                        }
                    };

                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!("websocket client lagged by {} alerts", n);
                }
                Err(RecvError::Closed) => {
                    break;
                }
            }
        }
    });

    // Handle incoming messages (ping/pong) in the main task
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Ping(_) | Message::Pong(_) => {
                // Axum answers pings on its own
            }
            Message::Close(_) => {
                break;
            }
            _ => {}
        }
    }

    // Abort the forward task when the connection closes
    send_task.abort();
    state.metrics.ws_client_disconnected();

    info!("websocket connection closed");
}
