//! UseCase: Room 参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 初回参加では参加者ドキュメントを作成し、再参加では在室状態を更新すること（冪等）
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回参加、再参加（リロード）で投票が保持される
//! - 異常系：存在しない Room、終了済みの Room

use std::sync::Arc;

use crate::domain::{
    NewParticipant, ParticipantId, ParticipantName, ParticipantPatch, Room, RoomId, RoomStatus,
    RoomStore,
};

use super::error::JoinRoomError;

/// 参加処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room: Room,
    /// 既存の参加者ドキュメントを更新した場合は `true`
    pub rejoined: bool,
}

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn RoomStore>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// 参加を実行（参加者ドキュメントの作成または更新）
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加成功
    /// * `Err(JoinRoomError)` - 参加失敗
    pub async fn execute(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        name: ParticipantName,
    ) -> Result<JoinOutcome, JoinRoomError> {
        // 1. Room の存在と状態を確認
        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or_else(|| JoinRoomError::RoomNotFound(room_id.to_string()))?;
        if room.status == RoomStatus::Ended {
            return Err(JoinRoomError::RoomEnded(room_id.to_string()));
        }

        // 2. 参加者ドキュメントを作成、または在室状態を更新
        let existing = self.store.get_participant(room_id, participant_id).await?;
        let rejoined = existing.is_some();
        if rejoined {
            self.store
                .update_participant(room_id, participant_id, ParticipantPatch::rejoin(name))
                .await?;
        } else {
            self.store
                .set_participant(
                    room_id,
                    NewParticipant {
                        id: participant_id.clone(),
                        name,
                    },
                )
                .await?;
        }

        tracing::info!(
            "Participant '{}' {} room {}",
            participant_id,
            if rejoined { "rejoined" } else { "joined" },
            room_id
        );

        Ok(JoinOutcome { room, rejoined })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Card, NewRoom, RoomPatch, Timestamp, Topic},
        infrastructure::store::InMemoryRoomStore,
    };
    use yoriai_shared::time::ManualClock;

    fn room_id() -> RoomId {
        RoomId::new("JOIN01".to_string()).unwrap()
    }

    fn pid(value: &str) -> ParticipantId {
        ParticipantId::new(value.to_string()).unwrap()
    }

    fn name(value: &str) -> ParticipantName {
        ParticipantName::new(value.to_string()).unwrap()
    }

    async fn create_test_store(clock: ManualClock) -> Arc<InMemoryRoomStore> {
        let store = Arc::new(InMemoryRoomStore::new(Arc::new(clock)));
        store
            .create_room(NewRoom {
                id: room_id(),
                host_id: pid("host"),
                topic: Topic::new("Release cadence".to_string()).unwrap(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_first_join_creates_online_participant() {
        // テスト項目: 初回参加で online・未投票の参加者ドキュメントが作成される
        // given (前提条件):
        let store = create_test_store(ManualClock::new(1_000)).await;
        let usecase = JoinRoomUseCase::new(store.clone());

        // when (操作):
        let outcome = usecase
            .execute(&room_id(), &pid("alice"), name("Alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!outcome.rejoined);
        let alice = store
            .get_participant(&room_id(), &pid("alice"))
            .await
            .unwrap()
            .unwrap();
        assert!(alice.online);
        assert_eq!(alice.selected_card, None);
        assert_eq!(alice.last_seen_at, Timestamp::new(1_000));
    }

    #[tokio::test]
    async fn test_rejoin_refreshes_presence_and_keeps_vote() {
        // テスト項目: 再参加では online と last_seen_at を更新し、投票は保持される
        // given (前提条件):
        let clock = ManualClock::new(1_000);
        let store = create_test_store(clock.clone()).await;
        let usecase = JoinRoomUseCase::new(store.clone());
        usecase
            .execute(&room_id(), &pid("alice"), name("Alice"))
            .await
            .unwrap();
        store
            .update_participant(
                &room_id(),
                &pid("alice"),
                ParticipantPatch::vote(Some(Card::new(6).unwrap())),
            )
            .await
            .unwrap();
        store
            .update_participant(&room_id(), &pid("alice"), ParticipantPatch::offline())
            .await
            .unwrap();
        clock.advance(60_000);

        // when (操作):
        let outcome = usecase
            .execute(&room_id(), &pid("alice"), name("Alice B"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(outcome.rejoined);
        let alice = store
            .get_participant(&room_id(), &pid("alice"))
            .await
            .unwrap()
            .unwrap();
        assert!(alice.online);
        assert_eq!(alice.name.as_str(), "Alice B");
        assert_eq!(alice.selected_card, Some(Card::new(6).unwrap()));
        assert_eq!(alice.last_seen_at, Timestamp::new(61_000));
        assert_eq!(store.list_participants(&room_id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_join_missing_room_is_not_found() {
        // テスト項目: 存在しない Room への参加は RoomNotFound になる
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new(Arc::new(ManualClock::new(0))));
        let usecase = JoinRoomUseCase::new(store);

        // when (操作):
        let result = usecase
            .execute(&room_id(), &pid("alice"), name("Alice"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::RoomNotFound("JOIN01".to_string())));
    }

    #[tokio::test]
    async fn test_join_ended_room_is_rejected() {
        // テスト項目: 終了済みの Room には参加できない
        // given (前提条件):
        let store = create_test_store(ManualClock::new(0)).await;
        store
            .update_room(&room_id(), RoomPatch::status(RoomStatus::Ended))
            .await
            .unwrap();
        let usecase = JoinRoomUseCase::new(store.clone());

        // when (操作):
        let result = usecase
            .execute(&room_id(), &pid("alice"), name("Alice"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::RoomEnded("JOIN01".to_string())));
        assert!(store.list_participants(&room_id()).await.unwrap().is_empty());
    }
}
