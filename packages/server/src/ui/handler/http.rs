//! HTTP API endpoint handlers.
//!
//! Each handler maps one `RoomStore` operation onto a route. Request bodies are
//! the domain write types (validated on deserialization); responses are DTOs.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{
        NewParticipant, NewRoom, NewVoteResult, ParticipantId, ParticipantPatch, RoomId,
        RoomPatch, StoreError, WriteBatch,
    },
    infrastructure::dto::http::{
        ErrorResponse, ListQuery, ParticipantDto, RoomDto, VoteResultDto,
    },
    ui::state::AppState,
    usecase::{DEFAULT_HISTORY_LIMIT, DEFAULT_ROOM_LIST_LIMIT},
};

/// Store エラーを HTTP レスポンスに変換するラッパー
#[derive(Debug)]
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::AlreadyExists(_) | StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
            StoreError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Store error: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

fn parse_room_id(raw: String) -> Result<RoomId, ApiError> {
    RoomId::new(raw).map_err(|e| ApiError(StoreError::Invalid(e.to_string())))
}

fn parse_participant_id(raw: String) -> Result<ParticipantId, ApiError> {
    ParticipantId::new(raw).map_err(|e| ApiError(StoreError::Invalid(e.to_string())))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms (newest first)
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<RoomDto>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_ROOM_LIST_LIMIT);
    let rooms = state.store.list_rooms(limit).await?;

    // Domain Model から DTO への変換
    Ok(Json(rooms.into_iter().map(RoomDto::from).collect()))
}

/// Create a room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(room): Json<NewRoom>,
) -> Result<(StatusCode, Json<RoomDto>), ApiError> {
    let room = state.store.create_room(room).await?;
    tracing::info!("Room {} created", room.id);
    Ok((StatusCode::CREATED, Json(room.into())))
}

/// Get room by ID
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDto>, ApiError> {
    let room_id = parse_room_id(room_id)?;
    match state.store.get_room(&room_id).await? {
        Some(room) => Ok(Json(room.into())),
        None => Err(StoreError::NotFound(format!("rooms/{}", room_id)).into()),
    }
}

/// Patch a room
pub async fn update_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(patch): Json<RoomPatch>,
) -> Result<StatusCode, ApiError> {
    let room_id = parse_room_id(room_id)?;
    state.store.update_room(&room_id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get participants of a room
pub async fn list_participants(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ParticipantDto>>, ApiError> {
    let room_id = parse_room_id(room_id)?;
    let participants = state.store.list_participants(&room_id).await?;
    Ok(Json(
        participants.into_iter().map(ParticipantDto::from).collect(),
    ))
}

/// Get a participant
pub async fn get_participant(
    State(state): State<Arc<AppState>>,
    Path((room_id, participant_id)): Path<(String, String)>,
) -> Result<Json<ParticipantDto>, ApiError> {
    let room_id = parse_room_id(room_id)?;
    let participant_id = parse_participant_id(participant_id)?;
    match state
        .store
        .get_participant(&room_id, &participant_id)
        .await?
    {
        Some(participant) => Ok(Json(participant.into())),
        None => Err(StoreError::NotFound(format!(
            "rooms/{}/participants/{}",
            room_id, participant_id
        ))
        .into()),
    }
}

/// Create or replace a participant
///
/// The body's id must match the path.
pub async fn set_participant(
    State(state): State<Arc<AppState>>,
    Path((room_id, participant_id)): Path<(String, String)>,
    Json(participant): Json<NewParticipant>,
) -> Result<StatusCode, ApiError> {
    let room_id = parse_room_id(room_id)?;
    let participant_id = parse_participant_id(participant_id)?;
    if participant.id != participant_id {
        return Err(StoreError::Invalid(format!(
            "participant id mismatch: path '{}', body '{}'",
            participant_id, participant.id
        ))
        .into());
    }
    state.store.set_participant(&room_id, participant).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Patch a participant
pub async fn update_participant(
    State(state): State<Arc<AppState>>,
    Path((room_id, participant_id)): Path<(String, String)>,
    Json(patch): Json<ParticipantPatch>,
) -> Result<StatusCode, ApiError> {
    let room_id = parse_room_id(room_id)?;
    let participant_id = parse_participant_id(participant_id)?;
    state
        .store
        .update_participant(&room_id, &participant_id, patch)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply an atomic batch
pub async fn commit_batch(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<WriteBatch>,
) -> Result<StatusCode, ApiError> {
    let ops = batch.len();
    state.store.commit(batch).await?;
    tracing::debug!("Committed batch of {} ops", ops);
    Ok(StatusCode::NO_CONTENT)
}

/// Get vote results (newest first)
pub async fn list_vote_results(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<VoteResultDto>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let results = state.store.list_vote_results(limit).await?;
    Ok(Json(results.into_iter().map(VoteResultDto::from).collect()))
}

/// Append a vote result
pub async fn add_vote_result(
    State(state): State<Arc<AppState>>,
    Json(result): Json<NewVoteResult>,
) -> Result<(StatusCode, Json<VoteResultDto>), ApiError> {
    let result = state.store.add_vote_result(result).await?;
    Ok((StatusCode::CREATED, Json(result.into())))
}
