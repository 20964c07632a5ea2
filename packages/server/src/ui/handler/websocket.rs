//! WebSocket subscription handlers.
//!
//! A connection watches one key. The current snapshot is pushed on connect,
//! then one message per change until either side closes.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use serde::Serialize;

use crate::{
    domain::RoomId,
    infrastructure::dto::websocket::{ParticipantsSnapshotMessage, RoomSnapshotMessage},
    ui::state::AppState,
};

fn parse_room_id(raw: &str) -> Result<RoomId, StatusCode> {
    RoomId::new(raw.to_string()).map_err(|e| {
        tracing::warn!("Invalid room id '{}': {}", raw, e);
        StatusCode::BAD_REQUEST
    })
}

/// `rooms/{roomId}` の購読
pub async fn room_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let room_id = parse_room_id(&room_id)?;

    Ok(ws.on_upgrade(move |socket| async move {
        let snapshots = match state.store.subscribe_room(&room_id).await {
            Ok(stream) => stream.map(RoomSnapshotMessage::new),
            Err(e) => {
                tracing::error!("Failed to subscribe to room {}: {}", room_id, e);
                return;
            }
        };
        tracing::info!("Subscriber attached to rooms/{}", room_id);
        handle_socket(socket, snapshots, format!("rooms/{}", room_id)).await;
    }))
}

/// `rooms/{roomId}/participants` の購読
pub async fn participants_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let room_id = parse_room_id(&room_id)?;

    Ok(ws.on_upgrade(move |socket| async move {
        let snapshots = match state.store.subscribe_participants(&room_id).await {
            Ok(stream) => stream.map(ParticipantsSnapshotMessage::new),
            Err(e) => {
                tracing::error!("Failed to subscribe to participants of {}: {}", room_id, e);
                return;
            }
        };
        tracing::info!("Subscriber attached to rooms/{}/participants", room_id);
        handle_socket(
            socket,
            snapshots,
            format!("rooms/{}/participants", room_id),
        )
        .await;
    }))
}

/// Pushes every snapshot to the sender until the stream ends or the socket fails.
async fn pusher_loop<S, T>(mut snapshots: S, mut sender: SplitSink<WebSocket, Message>, key: &str)
where
    S: Stream<Item = T> + Unpin,
    T: Serialize,
{
    while let Some(snapshot) = snapshots.next().await {
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize snapshot for {}: {}", key, e);
                continue;
            }
        };
        if sender.send(Message::Text(json.into())).await.is_err() {
            break;
        }
        tracing::debug!("Pushed snapshot for {}", key);
    }
    let _ = sender.close().await;
}

async fn handle_socket<S, T>(socket: WebSocket, snapshots: S, key: String)
where
    S: Stream<Item = T> + Unpin + Send + 'static,
    T: Serialize,
{
    let (sender, mut receiver) = socket.split();

    // 購読側からのメッセージは読み捨て、切断の検出だけに使う
    let recv_key = key.clone();
    let recv_loop = async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::debug!("Subscriber for {} requested close", recv_key);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("WebSocket error on {}: {}", recv_key, e);
                    break;
                }
            }
        }
    };

    // If either side completes, drop the other
    tokio::select! {
        _ = pusher_loop(snapshots, sender, &key) => {},
        _ = recv_loop => {},
    }

    tracing::info!("Subscriber detached from {}", key);
}
