//! UseCase: カード選択処理
//!
//! 現在と同じカードを選ぶと投票を取り消し、異なるカードなら上書きします。
//! 書き込みは参加者ドキュメント 1 件の更新のみです。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SelectCardUseCase::execute() のトグル動作と状態チェック
//!
//! ### どのような状況を想定しているか
//! - 正常系：投票、上書き、同じカードでの取り消し
//! - 異常系：公開中の Room、未参加の参加者、ストアの書き込み失敗

use std::sync::Arc;

use crate::domain::{
    Card, ParticipantId, ParticipantPatch, RoomId, RoomStore, state_machine::can_select_card,
};

use super::error::SelectCardError;

/// カード選択のユースケース
pub struct SelectCardUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn RoomStore>,
}

impl SelectCardUseCase {
    /// 新しい SelectCardUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// カード選択を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Option<Card>)` - 書き込み後の選択カード（取り消した場合は `None`）
    /// * `Err(SelectCardError)` - 選択失敗
    pub async fn execute(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        card: Card,
    ) -> Result<Option<Card>, SelectCardError> {
        // 1. 投票受付中か確認
        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or_else(|| SelectCardError::RoomNotFound(room_id.to_string()))?;
        if !can_select_card(&room) {
            return Err(SelectCardError::NotVoting(room.status));
        }

        // 2. 現在の選択からトグル後の値を決定
        let participant = self
            .store
            .get_participant(room_id, participant_id)
            .await?
            .ok_or_else(|| SelectCardError::NotJoined(participant_id.to_string()))?;
        let next = toggle(participant.selected_card, card);

        // 3. 参加者ドキュメントを更新
        self.store
            .update_participant(room_id, participant_id, ParticipantPatch::vote(next))
            .await?;

        tracing::debug!(
            "Participant '{}' in room {} now has card {:?}",
            participant_id,
            room_id,
            next.map(|c| c.value())
        );
        Ok(next)
    }
}

/// 同じカードなら取り消し、異なるカードなら上書き
pub fn toggle(current: Option<Card>, selected: Card) -> Option<Card> {
    if current == Some(selected) {
        None
    } else {
        Some(selected)
    }
}
