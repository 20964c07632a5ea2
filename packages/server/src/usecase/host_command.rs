//! UseCase: ホスト専用コマンド（公開・リセット・終了）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - HostCommandUseCase の reveal / reset_round / end_room
//! - 書き込み前にホスト権限と Room の状態を再確認すること
//! - reset_round が Room 状態と全員の投票を 1 つのバッチで書き換えること
//! - end_room が投票結果レコードと終了状態を 1 つのバッチで書き込むこと
//! - 読み取り後に Room が先に遷移していた場合、状態の書き込みが拒否されること
//!
//! ### なぜこのテストが必要か
//! - UI の表示がずれていても、ホスト以外の書き込みが発生してはならない
//! - 「状態は voting なのに古い票が残る」途中状態を防ぐ必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：各遷移
//! - 異常系：ホスト以外の実行、誤った状態からの遷移、存在しない Room

use std::sync::Arc;

use crate::domain::{
    HostCommand, NewVoteResult, ParticipantId, ParticipantPatch, RoomId, RoomPatch, RoomStatus,
    RoomStore, Tally, WriteBatch, state_machine::plan_transition,
};

use super::error::HostCommandError;

/// ホスト専用コマンドのユースケース
pub struct HostCommandUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn RoomStore>,
}

impl HostCommandUseCase {
    /// 新しい HostCommandUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// 投票を公開する（voting → revealed）
    pub async fn reveal(
        &self,
        room_id: &RoomId,
        remembered_host_id: Option<&ParticipantId>,
    ) -> Result<RoomStatus, HostCommandError> {
        self.execute(room_id, remembered_host_id, HostCommand::Reveal)
            .await
    }

    /// 次のラウンドに戻す（revealed → voting、全員の投票を取り消す）
    pub async fn reset_round(
        &self,
        room_id: &RoomId,
        remembered_host_id: Option<&ParticipantId>,
    ) -> Result<RoomStatus, HostCommandError> {
        self.execute(room_id, remembered_host_id, HostCommand::ResetRound)
            .await
    }

    /// 議題を終了する（revealed → ended、投票結果を記録する）
    pub async fn end_room(
        &self,
        room_id: &RoomId,
        remembered_host_id: Option<&ParticipantId>,
    ) -> Result<RoomStatus, HostCommandError> {
        self.execute(room_id, remembered_host_id, HostCommand::EndRoom)
            .await
    }

    /// コマンドを実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 対象の Room
    /// * `remembered_host_id` - 呼び出し元がこの Room について記憶しているホスト ID
    /// * `command` - 実行するコマンド
    ///
    /// # Returns
    ///
    /// * `Ok(RoomStatus)` - 遷移後の状態
    /// * `Err(HostCommandError)` - 拒否または書き込み失敗（拒否の場合は何も書き込まない）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        remembered_host_id: Option<&ParticipantId>,
        command: HostCommand,
    ) -> Result<RoomStatus, HostCommandError> {
        // 1. 最新の Room に対して権限と状態を確認
        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or_else(|| HostCommandError::RoomNotFound(room_id.to_string()))?;
        let next = plan_transition(&room, remembered_host_id, command)?;

        // 2. 書き込み
        match command {
            HostCommand::Reveal => {
                self.store
                    .update_room(room_id, RoomPatch::transition(room.status, next))
                    .await?;
            }
            HostCommand::ResetRound => {
                let participants = self.store.list_participants(room_id).await?;
                let batch = participants.into_iter().fold(
                    WriteBatch::new()
                        .update_room(room_id.clone(), RoomPatch::transition(room.status, next)),
                    |batch, p| {
                        batch.update_participant(room_id.clone(), p.id, ParticipantPatch::vote(None))
                    },
                );
                self.store.commit(batch).await?;
            }
            HostCommand::EndRoom => {
                let participants = self.store.list_participants(room_id).await?;
                let podium = Tally::compute(&participants).podium();
                let batch = WriteBatch::new()
                    .add_vote_result(NewVoteResult {
                        room_id: room_id.clone(),
                        topic: room.topic.clone(),
                        results: podium,
                    })
                    .update_room(room_id.clone(), RoomPatch::transition(room.status, next));
                self.store.commit(batch).await?;
            }
        }

        tracing::info!("Room {}: {} ({} -> {})", room_id, command, room.status, next);
        Ok(next)
    }
}
