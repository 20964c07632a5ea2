//! Error types for the Yoriai client.

use thiserror::Error;
use yoriai_server::{
    domain::{StoreError, ValueObjectError},
    usecase::{
        CreateRoomError, HostCommandError, JoinRoomError, ListError, PresenceError,
        SelectCardError,
    },
};

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Server URL is not http(s)
    #[error("Invalid server URL '{0}': expected http:// or https://")]
    InvalidServerUrl(String),

    /// Local identity file could not be read or written
    #[error("Identity store error: {0}")]
    Identity(String),
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        Self::Identity(error.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::Identity(error.to_string())
    }
}

/// Errors surfaced at the command boundary of a room session or the lobby
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Room {0} was not found")]
    RoomNotFound(String),

    #[error("Room {0} has already ended")]
    RoomEnded(String),

    /// Host-only command issued by a non-host; nothing was written
    #[error("Only the host can {0}")]
    NotHost(&'static str),

    /// A card selection is still in flight
    #[error("A vote is already being submitted")]
    Busy,

    #[error("This room session is over")]
    Terminated,

    #[error(transparent)]
    Invalid(#[from] ValueObjectError),

    #[error(transparent)]
    Join(JoinRoomError),

    #[error(transparent)]
    CreateRoom(#[from] CreateRoomError),

    #[error(transparent)]
    SelectCard(#[from] SelectCardError),

    #[error(transparent)]
    HostCommand(#[from] HostCommandError),

    #[error(transparent)]
    Presence(#[from] PresenceError),

    #[error(transparent)]
    List(#[from] ListError),

    #[error("failed to subscribe: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl From<JoinRoomError> for SessionError {
    fn from(error: JoinRoomError) -> Self {
        match error {
            JoinRoomError::RoomNotFound(room_id) => Self::RoomNotFound(room_id),
            JoinRoomError::RoomEnded(room_id) => Self::RoomEnded(room_id),
            other => Self::Join(other),
        }
    }
}
