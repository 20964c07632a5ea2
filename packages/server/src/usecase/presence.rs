//! UseCase: 在室状態の書き込み
//!
//! ハートビート、表示状態の切り替え、離脱時のオフライン申告に使います。

use std::sync::Arc;

use crate::domain::{ParticipantId, ParticipantPatch, RoomId, RoomStore};

use super::error::PresenceError;

/// 在室状態のユースケース
pub struct PresenceUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn RoomStore>,
}

impl PresenceUseCase {
    /// 新しい PresenceUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// `online = true` と `last_seen_at = サーバー時刻` を書き込む
    pub async fn heartbeat(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<(), PresenceError> {
        self.store
            .update_participant(room_id, participant_id, ParticipantPatch::heartbeat())
            .await?;
        tracing::trace!("Heartbeat for '{}' in room {}", participant_id, room_id);
        Ok(())
    }

    /// `online = false` を書き込む
    pub async fn mark_offline(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<(), PresenceError> {
        self.store
            .update_participant(room_id, participant_id, ParticipantPatch::offline())
            .await?;
        tracing::debug!("Participant '{}' marked offline in room {}", participant_id, room_id);
        Ok(())
    }
}
