//! Remote document store over HTTP and WebSocket.
//!
//! Reads and writes go through the server's REST routes; subscriptions open a
//! WebSocket per watched key and reconnect a bounded number of times before the
//! stream ends.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use yoriai_server::{
    domain::{
        NewParticipant, NewRoom, NewVoteResult, Participant, ParticipantId, ParticipantPatch,
        Room, RoomId, RoomPatch, RoomStore, StoreError, Subscription, ValueObjectError,
        VoteResult, WriteBatch,
    },
    infrastructure::dto::{
        http::{ErrorResponse, ParticipantDto, RoomDto, VoteResultDto},
        websocket::{ParticipantsSnapshotMessage, RoomSnapshotMessage},
    },
};

use crate::error::ClientError;

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// `RoomStore` backed by a remote Yoriai server
pub struct HttpRoomStore {
    http: reqwest::Client,
    /// e.g. `http://127.0.0.1:8080`
    api_base: String,
    /// e.g. `ws://127.0.0.1:8080`
    ws_base: String,
}

impl HttpRoomStore {
    /// Create a store for the server at `server_url` (`http://` or `https://`)
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let api_base = server_url.trim_end_matches('/').to_string();
        let ws_base = if let Some(rest) = api_base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else if let Some(rest) = api_base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else {
            return Err(ClientError::InvalidServerUrl(server_url.to_string()));
        };

        Ok(Self {
            http: reqwest::Client::new(),
            api_base,
            ws_base,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(error_from_response(response).await)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| StoreError::Invalid(e.to_string()))
    }

    /// 404 を `None` として扱う取得
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, StoreError> {
        match self.fetch(request).await {
            Ok(value) => Ok(Some(value)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn connect(&self, path: &str) -> Result<(String, Socket), StoreError> {
        let url = format!("{}{}", self.ws_base, path);
        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        tracing::debug!("Subscribed to {}", url);
        Ok((url, socket))
    }
}

async fn error_from_response(response: Response) -> StoreError {
    let status = response.status();
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();

    if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
        return error.into();
    }
    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(url),
        StatusCode::CONFLICT => StoreError::AlreadyExists(url),
        s if s.is_client_error() => StoreError::Invalid(format!("{}: {}", s, body)),
        s => StoreError::Unavailable(format!("{}: {}", s, body)),
    }
}

fn invalid(error: ValueObjectError) -> StoreError {
    StoreError::Invalid(error.to_string())
}

struct SocketState {
    url: String,
    socket: Option<Socket>,
    attempts: u32,
}

/// One reconnect attempt after a pause. Returns `false` once attempts are exhausted.
async fn reconnect(state: &mut SocketState) -> bool {
    if state.attempts >= MAX_RECONNECT_ATTEMPTS {
        tracing::error!(
            "Giving up on {} after {} attempts",
            state.url,
            MAX_RECONNECT_ATTEMPTS
        );
        return false;
    }
    state.attempts += 1;
    tokio::time::sleep(RECONNECT_INTERVAL).await;
    tracing::info!(
        "Reconnecting to {} (attempt {}/{})",
        state.url,
        state.attempts,
        MAX_RECONNECT_ATTEMPTS
    );
    match connect_async(state.url.as_str()).await {
        Ok((socket, _)) => {
            state.socket = Some(socket);
            state.attempts = 0;
        }
        Err(e) => tracing::warn!("Reconnect to {} failed: {}", state.url, e),
    }
    true
}

/// Snapshot stream over a WebSocket with bounded reconnection.
///
/// Messages that fail to parse or convert are logged and skipped.
fn snapshot_stream<M, T>(
    url: String,
    socket: Socket,
    convert: fn(M) -> Result<T, ValueObjectError>,
) -> Subscription<T>
where
    M: DeserializeOwned + Send + 'static,
    T: Send + 'static,
{
    let state = SocketState {
        url,
        socket: Some(socket),
        attempts: 0,
    };

    stream::unfold(state, move |mut state| async move {
        loop {
            let message = match state.socket.as_mut() {
                Some(socket) => socket.next().await,
                None => {
                    if !reconnect(&mut state).await {
                        return None;
                    }
                    continue;
                }
            };

            match message {
                Some(Ok(Message::Text(text))) => {
                    let converted = serde_json::from_str::<M>(&text)
                        .map_err(|e| e.to_string())
                        .and_then(|message| convert(message).map_err(|e| e.to_string()));
                    match converted {
                        Ok(snapshot) => return Some((snapshot, state)),
                        Err(e) => tracing::warn!("Dropping snapshot from {}: {}", state.url, e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::warn!("Subscription {} closed by server", state.url);
                    state.socket = None;
                }
                Some(Err(e)) => {
                    tracing::warn!("Subscription {} failed: {}", state.url, e);
                    state.socket = None;
                }
                Some(Ok(_)) => {}
            }
        }
    })
    .boxed()
}

fn room_snapshot(message: RoomSnapshotMessage) -> Result<Option<Room>, ValueObjectError> {
    message.room.map(Room::try_from).transpose()
}

fn participants_snapshot(
    message: ParticipantsSnapshotMessage,
) -> Result<Vec<Participant>, ValueObjectError> {
    message
        .participants
        .into_iter()
        .map(Participant::try_from)
        .collect()
}

#[async_trait]
impl RoomStore for HttpRoomStore {
    async fn create_room(&self, room: NewRoom) -> Result<Room, StoreError> {
        let dto: RoomDto = self
            .fetch(self.http.post(self.url("/api/rooms")).json(&room))
            .await?;
        Room::try_from(dto).map_err(invalid)
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError> {
        let dto: Option<RoomDto> = self
            .fetch_optional(self.http.get(self.url(&format!("/api/rooms/{}", room_id))))
            .await?;
        dto.map(Room::try_from).transpose().map_err(invalid)
    }

    async fn update_room(&self, room_id: &RoomId, patch: RoomPatch) -> Result<(), StoreError> {
        self.send(
            self.http
                .patch(self.url(&format!("/api/rooms/{}", room_id)))
                .json(&patch),
        )
        .await?;
        Ok(())
    }

    async fn list_rooms(&self, limit: usize) -> Result<Vec<Room>, StoreError> {
        let dtos: Vec<RoomDto> = self
            .fetch(
                self.http
                    .get(self.url("/api/rooms"))
                    .query(&[("limit", limit)]),
            )
            .await?;
        dtos.into_iter()
            .map(Room::try_from)
            .collect::<Result<_, _>>()
            .map_err(invalid)
    }

    async fn get_participant(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<Option<Participant>, StoreError> {
        let dto: Option<ParticipantDto> = self
            .fetch_optional(self.http.get(self.url(&format!(
                "/api/rooms/{}/participants/{}",
                room_id, participant_id
            ))))
            .await?;
        dto.map(Participant::try_from).transpose().map_err(invalid)
    }

    async fn list_participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, StoreError> {
        let dtos: Vec<ParticipantDto> = self
            .fetch(
                self.http
                    .get(self.url(&format!("/api/rooms/{}/participants", room_id))),
            )
            .await?;
        dtos.into_iter()
            .map(Participant::try_from)
            .collect::<Result<_, _>>()
            .map_err(invalid)
    }

    async fn set_participant(
        &self,
        room_id: &RoomId,
        participant: NewParticipant,
    ) -> Result<(), StoreError> {
        self.send(
            self.http
                .put(self.url(&format!(
                    "/api/rooms/{}/participants/{}",
                    room_id, participant.id
                )))
                .json(&participant),
        )
        .await?;
        Ok(())
    }

    async fn update_participant(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        patch: ParticipantPatch,
    ) -> Result<(), StoreError> {
        self.send(
            self.http
                .patch(self.url(&format!(
                    "/api/rooms/{}/participants/{}",
                    room_id, participant_id
                )))
                .json(&patch),
        )
        .await?;
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.send(self.http.post(self.url("/api/batch")).json(&batch))
            .await?;
        Ok(())
    }

    async fn subscribe_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription<Option<Room>>, StoreError> {
        let (url, socket) = self.connect(&format!("/ws/rooms/{}", room_id)).await?;
        Ok(snapshot_stream(url, socket, room_snapshot))
    }

    async fn subscribe_participants(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription<Vec<Participant>>, StoreError> {
        let (url, socket) = self
            .connect(&format!("/ws/rooms/{}/participants", room_id))
            .await?;
        Ok(snapshot_stream(url, socket, participants_snapshot))
    }

    async fn add_vote_result(&self, result: NewVoteResult) -> Result<VoteResult, StoreError> {
        let dto: VoteResultDto = self
            .fetch(self.http.post(self.url("/api/vote-results")).json(&result))
            .await?;
        VoteResult::try_from(dto).map_err(invalid)
    }

    async fn list_vote_results(&self, limit: usize) -> Result<Vec<VoteResult>, StoreError> {
        let dtos: Vec<VoteResultDto> = self
            .fetch(
                self.http
                    .get(self.url("/api/vote-results"))
                    .query(&[("limit", limit)]),
            )
            .await?;
        dtos.into_iter()
            .map(VoteResult::try_from)
            .collect::<Result<_, _>>()
            .map_err(invalid)
    }
}
