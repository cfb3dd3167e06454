//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{ConnectionId, DisplayName, RoomId},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
    usecase::{EditCodeError, SyncCodeError},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection_id = ConnectionId::generate();
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Spawns a task that forwards queued frames from the rx channel to the WebSocket sink.
///
/// The loop ends when the channel is closed (connection unregistered) or the
/// client stops accepting frames.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

/// Resolves once the server has finished its shutdown flush.
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    if shutdown.wait_for(|done| *done).await.is_err() {
        // sender dropped without shutting down
        std::future::pending::<()>().await;
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_client(connection_id.clone(), tx)
        .await;
    tracing::info!("Connection {} opened", connection_id);

    let recv_state = state.clone();
    let recv_connection_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on {}: {}", recv_connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch(&recv_state, &recv_connection_id, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", recv_connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
        _ = wait_for_shutdown(state.shutdown.clone()) => {
            tracing::debug!("Closing connection {} for shutdown", connection_id);
            recv_task.abort();
            send_task.abort();
        }
    };

    let outcome = state.leave_room_usecase.execute(&connection_id).await;
    tracing::debug!(
        "Connection {} closed after leaving {} rooms",
        connection_id,
        outcome.rooms.len()
    );
}

/// Route one inbound text frame to its use case.
///
/// Nothing is ever sent back to the client on failure.
async fn dispatch(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Ignoring unparseable frame from {}: {}", connection_id, e);
            return;
        }
    };

    match message {
        ClientMessage::Join {
            room_id,
            display_name,
        } => {
            let Some(room_id) = parse_room_id(connection_id, room_id) else {
                return;
            };
            state
                .join_room_usecase
                .execute(
                    connection_id.clone(),
                    room_id,
                    DisplayName::new(display_name),
                )
                .await;
        }
        ClientMessage::Edit { room_id, full_text } => {
            let Some(room_id) = parse_room_id(connection_id, room_id) else {
                return;
            };
            match state
                .edit_code_usecase
                .execute(connection_id, &room_id, full_text)
                .await
            {
                Ok(_relayed_to) => {}
                Err(EditCodeError::RoomNotFound(room)) => {
                    tracing::debug!("Dropped edit from {} for unknown room '{}'", connection_id, room);
                }
            }
        }
        ClientMessage::RequestSync { room_id, full_text } => {
            let Some(room_id) = parse_room_id(connection_id, room_id) else {
                return;
            };
            match state
                .sync_code_usecase
                .execute(connection_id, &room_id, full_text)
                .await
            {
                Ok(()) => {}
                Err(SyncCodeError::RoomNotFound(room)) => {
                    tracing::debug!("Dropped sync request from {} for unknown room '{}'", connection_id, room);
                }
                Err(e @ SyncCodeError::PushFailed(_)) => {
                    tracing::warn!("Sync request from {} failed: {}", connection_id, e);
                }
            }
        }
    }
}

fn parse_room_id(connection_id: &ConnectionId, room_id: String) -> Option<RoomId> {
    match RoomId::new(room_id) {
        Ok(room_id) => Some(room_id),
        Err(e) => {
            tracing::warn!("Ignoring frame from {}: {}", connection_id, e);
            None
        }
    }
}
