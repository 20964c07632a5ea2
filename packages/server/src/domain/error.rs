//! Domain errors.

use thiserror::Error;

use super::entity::RoomStatus;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must be 6 uppercase alphanumeric characters, got '{0}'")]
    InvalidRoomId(String),

    #[error("participant id '{0}' is not a valid identifier")]
    InvalidParticipantId(String),

    #[error("name must be 1 to 20 characters, got {0}")]
    InvalidName(usize),

    #[error("topic must be 1 to 100 characters, got {0}")]
    InvalidTopic(usize),

    #[error("card must be between 1 and 7, got {0}")]
    InvalidCard(u8),

    #[error(
        "offline threshold ({threshold_ms} ms) must be at least 3x the heartbeat interval ({heartbeat_ms} ms)"
    )]
    InvalidPresencePolicy { heartbeat_ms: u128, threshold_ms: u128 },
}

/// Room の状態遷移エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// 呼び出し元がホストではない
    #[error("only the host can {0}")]
    NotHost(&'static str),

    /// 現在の状態では許可されない遷移
    #[error("cannot {action} while the room is {status}")]
    InvalidState {
        action: &'static str,
        status: RoomStatus,
    },
}

/// ドキュメントストアのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    /// 書き込みの前提条件（期待する状態）が満たされない
    #[error("document changed concurrently: {0}")]
    Conflict(String),

    #[error("invalid document: {0}")]
    Invalid(String),

    /// ネットワーク断などの一時的な失敗
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
