//! Entity 定義
//!
//! Room / Participant / VoteResult はドキュメントストア上のドキュメントに対応します。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value_object::{Card, ParticipantId, ParticipantName, RoomId, Timestamp, Topic};

/// Room のライフサイクル状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// 投票受付中（初期状態）
    Voting,
    /// 全員の投票を公開中
    Revealed,
    /// 終了（終端状態）
    Ended,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Voting => "voting",
            RoomStatus::Revealed => "revealed",
            RoomStatus::Ended => "ended",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomStatus::Ended)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room エンティティ（`rooms/{roomId}`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub status: RoomStatus,
    /// 作成者の参加者 ID（作成後は不変）
    pub host_id: ParticipantId,
    pub topic: Topic,
    pub created_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

impl Room {
    pub fn is_hosted_by(&self, participant_id: &ParticipantId) -> bool {
        &self.host_id == participant_id
    }
}

/// 参加者エンティティ（`rooms/{roomId}/participants/{participantId}`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: ParticipantName,
    /// 未投票なら `None`
    pub selected_card: Option<Card>,
    /// 最後に申告されたオンライン状態
    pub online: bool,
    /// 最後の生存通知をストアが受け付けた時刻
    pub last_seen_at: Timestamp,
}

impl Participant {
    pub fn has_voted(&self) -> bool {
        self.selected_card.is_some()
    }
}

/// 順位付きのカード集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCard {
    pub card: Card,
    pub count: usize,
    pub rank: usize,
}

/// 議題ごとの投票結果の記録（`vote_results/{resultId}`、追記のみ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub id: String,
    pub room_id: RoomId,
    pub topic: Topic,
    /// 順位 3 位以内かつ票数 1 以上のカード（順位、カード値の順）
    pub results: Vec<RankedCard>,
    pub voted_at: Timestamp,
}
