//! HTTP API の DTO
//!
//! ドメインモデルをそのまま公開せず、ワイヤーフォーマットを固定するための型です。

use serde::{Deserialize, Serialize};

use crate::domain::RoomStatus;

/// Room ドキュメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDto {
    pub room_id: String,
    pub status: RoomStatus,
    pub host_id: String,
    pub topic: String,
    pub created_at: i64,
    pub ended_at: Option<i64>,
}

/// 参加者ドキュメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub participant_id: String,
    pub name: String,
    pub selected_card: Option<u8>,
    pub online: bool,
    pub last_seen_at: i64,
}

/// 順位付きカード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCardDto {
    pub card: u8,
    pub count: usize,
    pub rank: usize,
}

/// 投票結果レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResultDto {
    pub result_id: String,
    pub room_id: String,
    pub topic: String,
    pub results: Vec<RankedCardDto>,
    pub voted_at: i64,
}

/// 一覧取得のクエリ
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// エラーの種類（クライアントで StoreError を復元するため）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Conflict,
    Invalid,
    Unavailable,
}

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}
