//! UseCase: Room 作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//! - Room とホストの参加者ドキュメントが 1 つのバッチで作成されること
//!
//! ### なぜこのテストが必要か
//! - 作成直後のホストが参加者一覧に未投票で表示される必要がある
//! - 書き込みが返ってこない場合に利用者を待たせ続けないこと（タイムアウト）を保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：Room 作成
//! - 異常系：ストアが応答しない（タイムアウト）

use std::{sync::Arc, time::Duration};

use crate::domain::{
    NewParticipant, NewRoom, ParticipantId, ParticipantName, Room, RoomIdFactory, RoomStore,
    StoreError, Topic, WriteBatch,
};

use super::error::CreateRoomError;

/// Room 作成の書き込みを待つ上限
pub const CREATE_ROOM_TIMEOUT: Duration = Duration::from_secs(15);

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn RoomStore>,
    /// 書き込みの制限時間
    timeout: Duration,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self::with_timeout(store, CREATE_ROOM_TIMEOUT)
    }

    /// 制限時間を指定して作成
    pub fn with_timeout(store: Arc<dyn RoomStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Room 作成を実行
    ///
    /// Room ドキュメントとホストの参加者ドキュメントを 1 つのバッチで書き込みます。
    /// タイムアウトした場合、Room が作成されたかどうかは分かりません（ロールバックは行わない）。
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - 作成された Room
    /// * `Err(CreateRoomError)` - 作成失敗
    pub async fn execute(
        &self,
        host_id: ParticipantId,
        host_name: ParticipantName,
        topic: Topic,
    ) -> Result<Room, CreateRoomError> {
        let room_id = RoomIdFactory::generate()?;

        let batch = WriteBatch::new()
            .create_room(NewRoom {
                id: room_id.clone(),
                host_id: host_id.clone(),
                topic,
            })
            .set_participant(
                room_id.clone(),
                NewParticipant {
                    id: host_id,
                    name: host_name,
                },
            );

        let write = async {
            self.store.commit(batch).await?;
            self.store
                .get_room(&room_id)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("rooms/{}", room_id)))
        };

        match tokio::time::timeout(self.timeout, write).await {
            Ok(result) => {
                let room = result?;
                tracing::info!("Room {} created by '{}'", room.id, room.host_id);
                Ok(room)
            }
            Err(_) => {
                tracing::warn!(
                    "Creating room {} timed out after {:?}",
                    room_id,
                    self.timeout
                );
                Err(CreateRoomError::Timeout(self.timeout.as_millis()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            NewVoteResult, Participant, ParticipantPatch, RoomId, RoomPatch, RoomStatus,
            Subscription, VoteResult,
        },
        infrastructure::store::InMemoryRoomStore,
    };
    use async_trait::async_trait;
    use yoriai_shared::time::SystemClock;

    /// commit だけが遅いストア
    struct SlowCommitStore {
        inner: InMemoryRoomStore,
        delay: Duration,
    }

    #[async_trait]
    impl RoomStore for SlowCommitStore {
        async fn create_room(&self, room: NewRoom) -> Result<Room, StoreError> {
            self.inner.create_room(room).await
        }
        async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError> {
            self.inner.get_room(room_id).await
        }
        async fn update_room(&self, room_id: &RoomId, patch: RoomPatch) -> Result<(), StoreError> {
            self.inner.update_room(room_id, patch).await
        }
        async fn list_rooms(&self, limit: usize) -> Result<Vec<Room>, StoreError> {
            self.inner.list_rooms(limit).await
        }
        async fn get_participant(
            &self,
            room_id: &RoomId,
            participant_id: &ParticipantId,
        ) -> Result<Option<Participant>, StoreError> {
            self.inner.get_participant(room_id, participant_id).await
        }
        async fn list_participants(
            &self,
            room_id: &RoomId,
        ) -> Result<Vec<Participant>, StoreError> {
            self.inner.list_participants(room_id).await
        }
        async fn set_participant(
            &self,
            room_id: &RoomId,
            participant: NewParticipant,
        ) -> Result<(), StoreError> {
            self.inner.set_participant(room_id, participant).await
        }
        async fn update_participant(
            &self,
            room_id: &RoomId,
            participant_id: &ParticipantId,
            patch: ParticipantPatch,
        ) -> Result<(), StoreError> {
            self.inner
                .update_participant(room_id, participant_id, patch)
                .await
        }
        async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner.commit(batch).await
        }
        async fn subscribe_room(
            &self,
            room_id: &RoomId,
        ) -> Result<Subscription<Option<Room>>, StoreError> {
            self.inner.subscribe_room(room_id).await
        }
        async fn subscribe_participants(
            &self,
            room_id: &RoomId,
        ) -> Result<Subscription<Vec<Participant>>, StoreError> {
            self.inner.subscribe_participants(room_id).await
        }
        async fn add_vote_result(&self, result: NewVoteResult) -> Result<VoteResult, StoreError> {
            self.inner.add_vote_result(result).await
        }
        async fn list_vote_results(&self, limit: usize) -> Result<Vec<VoteResult>, StoreError> {
            self.inner.list_vote_results(limit).await
        }
    }

    fn host_id() -> ParticipantId {
        ParticipantId::new("host-1".to_string()).unwrap()
    }

    fn name(value: &str) -> ParticipantName {
        ParticipantName::new(value.to_string()).unwrap()
    }

    fn topic() -> Topic {
        Topic::new("T".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_room_writes_room_and_host_participant() {
        // テスト項目: Room 作成で状態 voting の Room と未投票のホスト参加者が作られる
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new(Arc::new(SystemClock)));
        let usecase = CreateRoomUseCase::new(store.clone());

        // when (操作):
        let room = usecase
            .execute(host_id(), name("Hana"), topic())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.status, RoomStatus::Voting);
        assert_eq!(room.host_id, host_id());
        assert_eq!(room.topic.as_str(), "T");

        let participants = store.list_participants(&room.id).await.unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].id, host_id());
        assert_eq!(participants[0].name.as_str(), "Hana");
        assert_eq!(participants[0].selected_card, None);
        assert!(participants[0].online);
    }

    #[tokio::test]
    async fn test_create_room_times_out_when_store_hangs() {
        // テスト項目: ストアの書き込みが制限時間を超えるとタイムアウトエラーになる
        // given (前提条件):
        let store = Arc::new(SlowCommitStore {
            inner: InMemoryRoomStore::new(Arc::new(SystemClock)),
            delay: Duration::from_secs(5),
        });
        let usecase = CreateRoomUseCase::with_timeout(store, Duration::from_millis(50));

        // when (操作):
        let result = usecase.execute(host_id(), name("Hana"), topic()).await;

        // then (期待する結果):
        assert_eq!(result, Err(CreateRoomError::Timeout(50)));
    }

    #[tokio::test]
    async fn test_create_room_surfaces_store_failure() {
        // テスト項目: ストアの書き込み失敗はそのままエラーとして返される
        // given (前提条件):
        let mut store = crate::domain::store::MockRoomStore::new();
        store
            .expect_commit()
            .returning(|_| Err(StoreError::Unavailable("offline".to_string())));
        let usecase = CreateRoomUseCase::new(Arc::new(store));

        // when (操作):
        let result = usecase.execute(host_id(), name("Hana"), topic()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(CreateRoomError::Store(StoreError::Unavailable(
                "offline".to_string()
            )))
        );
    }
}
