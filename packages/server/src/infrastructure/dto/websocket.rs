//! WebSocket で push されるメッセージの DTO

use serde::{Deserialize, Serialize};

use super::http::{ParticipantDto, RoomDto};

/// メッセージの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    RoomSnapshot,
    ParticipantsSnapshot,
}

/// `rooms/{roomId}` のスナップショット（`room` が `None` なら存在しない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshotMessage {
    pub r#type: MessageType,
    pub room: Option<RoomDto>,
}

/// `rooms/{roomId}/participants` のスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantsSnapshotMessage {
    pub r#type: MessageType,
    pub participants: Vec<ParticipantDto>,
}
