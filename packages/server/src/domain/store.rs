//! Document store trait 定義
//!
//! ドメイン層が必要とするドキュメントストアへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層（インメモリ）とクライアント（HTTP/WebSocket）が提供します（依存性の逆転）。
//!
//! ## ドキュメントのキー
//!
//! ```text
//! rooms/{roomId}
//! rooms/{roomId}/participants/{participantId}
//! vote_results/{resultId}
//! ```
//!
//! ## サーバー付与タイムスタンプ
//!
//! パッチにはクライアントの時刻を含めません。`created_at` / `ended_at` /
//! `last_seen_at` / `voted_at` はストアが自身の時計で付与します。

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::{
    entity::{Participant, RankedCard, Room, RoomStatus, VoteResult},
    error::StoreError,
    value_object::{Card, ParticipantId, ParticipantName, RoomId, Topic},
};

/// 監視キーごとのスナップショット列
///
/// 購読直後に現在値を 1 回流し、以降は変更ごとに最新値を流します。
pub type Subscription<T> = BoxStream<'static, T>;

/// 新規 Room ドキュメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoom {
    pub id: RoomId,
    pub host_id: ParticipantId,
    pub topic: Topic,
}

/// Room ドキュメントの部分更新
///
/// `ended` の Room に対する状態変更は、前提条件の有無にかかわらず `StoreError::Conflict` になります。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPatch {
    pub status: Option<RoomStatus>,
    /// 書き込み時点の状態がこれと異なれば `StoreError::Conflict`（バッチ全体を破棄）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<RoomStatus>,
    /// `true` なら `ended_at` にサーバー時刻を付与する
    #[serde(default)]
    pub stamp_ended_at: bool,
}

impl RoomPatch {
    pub fn status(status: RoomStatus) -> Self {
        Self {
            status: Some(status),
            expected_status: None,
            stamp_ended_at: status == RoomStatus::Ended,
        }
    }

    /// `from` のときだけ `to` に遷移する
    pub fn transition(from: RoomStatus, to: RoomStatus) -> Self {
        Self {
            expected_status: Some(from),
            ..Self::status(to)
        }
    }
}

/// 参加者ドキュメントの作成（既存なら置き換え）
///
/// `online = true`、`last_seen_at` はサーバー時刻、`selected_card` は `None` で作成されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub id: ParticipantId,
    pub name: ParticipantName,
}

/// 参加者ドキュメントの部分更新
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantPatch {
    pub name: Option<ParticipantName>,
    /// `Some(None)` は投票の取り消し
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub selected_card: Option<Option<Card>>,
    pub online: Option<bool>,
    /// `true` なら `last_seen_at` にサーバー時刻を付与する
    #[serde(default)]
    pub touch_last_seen: bool,
}

impl ParticipantPatch {
    /// 生存通知（`online = true` とサーバー時刻）
    pub fn heartbeat() -> Self {
        Self {
            online: Some(true),
            touch_last_seen: true,
            ..Self::default()
        }
    }

    /// オフライン申告（`last_seen_at` は更新しない）
    pub fn offline() -> Self {
        Self {
            online: Some(false),
            ..Self::default()
        }
    }

    /// 再入室時の更新（表示名と生存通知）
    pub fn rejoin(name: ParticipantName) -> Self {
        Self {
            name: Some(name),
            ..Self::heartbeat()
        }
    }

    pub fn vote(card: Option<Card>) -> Self {
        Self {
            selected_card: Some(card),
            ..Self::default()
        }
    }
}

/// `Option<Option<T>>` を「フィールドなし」と「null」で区別してシリアライズする
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// 新規の投票結果レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVoteResult {
    pub room_id: RoomId,
    pub topic: Topic,
    pub results: Vec<RankedCard>,
}

/// アトミックなバッチ書き込みの 1 操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    CreateRoom {
        room: NewRoom,
    },
    UpdateRoom {
        room_id: RoomId,
        patch: RoomPatch,
    },
    SetParticipant {
        room_id: RoomId,
        participant: NewParticipant,
    },
    UpdateParticipant {
        room_id: RoomId,
        participant_id: ParticipantId,
        patch: ParticipantPatch,
    },
    AddVoteResult {
        result: NewVoteResult,
    },
}

/// 複数ドキュメントへのアトミックな書き込み
///
/// すべての操作が適用されるか、1 つも適用されないかのどちらかです。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBatch {
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_room(mut self, room: NewRoom) -> Self {
        self.ops.push(WriteOp::CreateRoom { room });
        self
    }

    pub fn update_room(mut self, room_id: RoomId, patch: RoomPatch) -> Self {
        self.ops.push(WriteOp::UpdateRoom { room_id, patch });
        self
    }

    pub fn set_participant(mut self, room_id: RoomId, participant: NewParticipant) -> Self {
        self.ops.push(WriteOp::SetParticipant {
            room_id,
            participant,
        });
        self
    }

    pub fn update_participant(
        mut self,
        room_id: RoomId,
        participant_id: ParticipantId,
        patch: ParticipantPatch,
    ) -> Self {
        self.ops.push(WriteOp::UpdateParticipant {
            room_id,
            participant_id,
            patch,
        });
        self
    }

    pub fn add_vote_result(mut self, result: NewVoteResult) -> Self {
        self.ops.push(WriteOp::AddVoteResult { result });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// Room Store trait
///
/// UseCase 層とクライアントのセッションはこの trait に依存し、具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Room を作成（同じ ID が既にあれば `AlreadyExists`）
    async fn create_room(&self, room: NewRoom) -> Result<Room, StoreError>;

    /// Room を取得（存在しなければ `None`）
    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError>;

    /// Room を部分更新
    async fn update_room(&self, room_id: &RoomId, patch: RoomPatch) -> Result<(), StoreError>;

    /// Room 一覧を新しい順に最大 `limit` 件取得
    async fn list_rooms(&self, limit: usize) -> Result<Vec<Room>, StoreError>;

    /// 参加者を取得（存在しなければ `None`）
    async fn get_participant(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<Option<Participant>, StoreError>;

    /// Room の全参加者を取得
    async fn list_participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, StoreError>;

    /// 参加者を作成（既存なら置き換え）
    async fn set_participant(
        &self,
        room_id: &RoomId,
        participant: NewParticipant,
    ) -> Result<(), StoreError>;

    /// 参加者を部分更新
    async fn update_participant(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        patch: ParticipantPatch,
    ) -> Result<(), StoreError>;

    /// バッチをアトミックに適用
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Room ドキュメントを購読
    async fn subscribe_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription<Option<Room>>, StoreError>;

    /// 参加者コレクションを購読
    async fn subscribe_participants(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription<Vec<Participant>>, StoreError>;

    /// 投票結果を追記
    async fn add_vote_result(&self, result: NewVoteResult) -> Result<VoteResult, StoreError>;

    /// 投票結果を新しい順に最大 `limit` 件取得
    async fn list_vote_results(&self, limit: usize) -> Result<Vec<VoteResult>, StoreError>;
}
