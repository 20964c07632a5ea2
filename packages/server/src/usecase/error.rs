//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RoomStatus, StoreError, TransitionError, ValueObjectError};

/// Room 作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    /// 制限時間内に書き込みが完了しなかった（作成されたかどうかは不明）
    #[error("failed to create room: timed out after {0} ms")]
    Timeout(u128),

    #[error("failed to create room: {0}")]
    InvalidRoomId(#[from] ValueObjectError),

    #[error("failed to create room: {0}")]
    Store(#[from] StoreError),
}

/// Room 参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("room {0} not found")]
    RoomNotFound(String),

    #[error("room {0} has already ended")]
    RoomEnded(String),

    #[error("failed to join room: {0}")]
    Store(#[from] StoreError),
}

/// カード選択のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectCardError {
    #[error("room {0} not found")]
    RoomNotFound(String),

    /// 投票受付中以外はカードを選べない
    #[error("cards can only be selected while voting (room is {0})")]
    NotVoting(RoomStatus),

    #[error("participant {0} has not joined this room")]
    NotJoined(String),

    #[error("failed to update vote: {0}")]
    Store(#[from] StoreError),
}

/// ホスト専用コマンドのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostCommandError {
    #[error("room {0} not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Rejected(#[from] TransitionError),

    #[error("failed to update room: {0}")]
    Store(#[from] StoreError),
}

/// 在室状態の書き込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    #[error("failed to update presence: {0}")]
    Store(#[from] StoreError),
}

/// 一覧取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("failed to load list: {0}")]
    Store(#[from] StoreError),
}
