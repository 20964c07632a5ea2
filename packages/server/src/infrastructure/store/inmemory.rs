//! InMemory Room Store 実装
//!
//! ドメイン層が定義する RoomStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用し、`tokio::sync::watch` で変更を購読者に push します。
//!
//! ## アトミック性
//!
//! すべての書き込みはバッチとして扱います。作業用コピーに全操作を適用し、
//! 1 つでも失敗すれば破棄、成功したときだけ差し替えます。ロックを保持したまま
//! 差し替えと通知を行うため、途中状態のスナップショットが購読者に届くことはありません。

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use crate::domain::{
    NewParticipant, NewRoom, NewVoteResult, Participant, ParticipantId, ParticipantPatch, Room,
    RoomId, RoomPatch, RoomStatus, RoomStore, StoreError, Subscription, Timestamp, VoteResult,
    WriteBatch, WriteOp,
};
use yoriai_shared::time::Clock;

/// Room ドキュメントと子コレクション
#[derive(Debug, Clone)]
struct RoomEntry {
    room: Room,
    participants: BTreeMap<ParticipantId, Participant>,
    /// 作成順（同時刻作成の並び順を安定させる）
    seq: u64,
}

/// 永続化されるデータ本体
#[derive(Debug, Clone, Default)]
struct Tables {
    rooms: HashMap<RoomId, RoomEntry>,
    vote_results: Vec<VoteResult>,
    next_seq: u64,
}

/// 1 つの Room に対する購読チャンネル
struct Watchers {
    room: watch::Sender<Option<Room>>,
    participants: watch::Sender<Vec<Participant>>,
}

impl Watchers {
    fn new(entry: Option<&RoomEntry>) -> Self {
        let (room, _) = watch::channel(entry.map(|e| e.room.clone()));
        let (participants, _) = watch::channel(entry.map(participant_snapshot).unwrap_or_default());
        Self { room, participants }
    }

    fn publish_room(&self, entry: Option<&RoomEntry>) {
        self.room.send_replace(entry.map(|e| e.room.clone()));
    }

    fn publish_participants(&self, entry: Option<&RoomEntry>) {
        self.participants
            .send_replace(entry.map(participant_snapshot).unwrap_or_default());
    }
}

struct Inner {
    tables: Tables,
    watchers: HashMap<RoomId, Watchers>,
    last_timestamp: i64,
}

/// 書き込みによって変更されたもの
#[derive(Debug, Clone, PartialEq, Eq)]
enum Touched {
    /// Room ドキュメント
    Room(RoomId),
    /// 参加者コレクション
    Participants(RoomId),
    VoteResult(VoteResult),
}

/// インメモリ Room Store 実装
pub struct InMemoryRoomStore {
    inner: Mutex<Inner>,
    /// サーバー時刻の付与に使う時計
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomStore {
    /// 新しい InMemoryRoomStore を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                tables: Tables::default(),
                watchers: HashMap::new(),
                last_timestamp: i64::MIN,
            }),
            clock,
        }
    }

    /// バッチを適用し、変更されたものを返す
    async fn apply(&self, batch: WriteBatch) -> Result<Vec<Touched>, StoreError> {
        let mut inner = self.inner.lock().await;

        // server timestamps never go backwards, even if the clock does
        let now = Timestamp::new(self.clock.now_millis().max(inner.last_timestamp));

        let mut working = inner.tables.clone();
        let mut touched = Vec::with_capacity(batch.ops.len());
        for op in batch.ops {
            touched.push(apply_op(&mut working, op, now)?);
        }

        inner.tables = working;
        inner.last_timestamp = now.value();

        // one push per touched key, after the swap
        let mut published: Vec<&Touched> = Vec::new();
        for t in &touched {
            if published.contains(&t) {
                continue;
            }
            match t {
                Touched::Room(room_id) => {
                    if let Some(watchers) = inner.watchers.get(room_id) {
                        watchers.publish_room(inner.tables.rooms.get(room_id));
                    }
                }
                Touched::Participants(room_id) => {
                    if let Some(watchers) = inner.watchers.get(room_id) {
                        watchers.publish_participants(inner.tables.rooms.get(room_id));
                    }
                }
                Touched::VoteResult(_) => {}
            }
            published.push(t);
        }

        tracing::debug!("Committed {} write(s) at {}", touched.len(), now.value());
        Ok(touched)
    }

    /// 購読チャンネルを取得（なければ作成）
    async fn watchers_for<T>(
        &self,
        room_id: &RoomId,
        select: impl FnOnce(&Watchers) -> watch::Receiver<T>,
    ) -> watch::Receiver<T> {
        let mut inner = self.inner.lock().await;
        let Inner {
            tables, watchers, ..
        } = &mut *inner;
        let entry = watchers
            .entry(room_id.clone())
            .or_insert_with(|| Watchers::new(tables.rooms.get(room_id)));
        select(entry)
    }
}

fn participant_snapshot(entry: &RoomEntry) -> Vec<Participant> {
    entry.participants.values().cloned().collect()
}

fn room_key(room_id: &RoomId) -> String {
    format!("rooms/{}", room_id)
}

fn participant_key(room_id: &RoomId, participant_id: &ParticipantId) -> String {
    format!("rooms/{}/participants/{}", room_id, participant_id)
}

fn apply_op(tables: &mut Tables, op: WriteOp, now: Timestamp) -> Result<Touched, StoreError> {
    match op {
        WriteOp::CreateRoom { room } => {
            let NewRoom { id, host_id, topic } = room;
            if tables.rooms.contains_key(&id) {
                return Err(StoreError::AlreadyExists(room_key(&id)));
            }
            let seq = tables.next_seq;
            tables.next_seq += 1;
            tables.rooms.insert(
                id.clone(),
                RoomEntry {
                    room: Room {
                        id: id.clone(),
                        status: RoomStatus::Voting,
                        host_id,
                        topic,
                        created_at: now,
                        ended_at: None,
                    },
                    participants: BTreeMap::new(),
                    seq,
                },
            );
            Ok(Touched::Room(id))
        }
        WriteOp::UpdateRoom { room_id, patch } => {
            let entry = tables
                .rooms
                .get_mut(&room_id)
                .ok_or_else(|| StoreError::NotFound(room_key(&room_id)))?;
            apply_room_patch(&mut entry.room, patch, now)?;
            Ok(Touched::Room(room_id))
        }
        WriteOp::SetParticipant {
            room_id,
            participant,
        } => {
            let entry = tables
                .rooms
                .get_mut(&room_id)
                .ok_or_else(|| StoreError::NotFound(room_key(&room_id)))?;
            let NewParticipant { id, name } = participant;
            entry.participants.insert(
                id.clone(),
                Participant {
                    id,
                    name,
                    selected_card: None,
                    online: true,
                    last_seen_at: now,
                },
            );
            Ok(Touched::Participants(room_id))
        }
        WriteOp::UpdateParticipant {
            room_id,
            participant_id,
            patch,
        } => {
            let participant = tables
                .rooms
                .get_mut(&room_id)
                .and_then(|entry| entry.participants.get_mut(&participant_id))
                .ok_or_else(|| StoreError::NotFound(participant_key(&room_id, &participant_id)))?;
            apply_participant_patch(participant, patch, now);
            Ok(Touched::Participants(room_id))
        }
        WriteOp::AddVoteResult { result } => {
            let NewVoteResult {
                room_id,
                topic,
                results,
            } = result;
            let record = VoteResult {
                id: Uuid::new_v4().to_string(),
                room_id,
                topic,
                results,
                voted_at: now,
            };
            tables.vote_results.push(record.clone());
            Ok(Touched::VoteResult(record))
        }
    }
}

fn apply_room_patch(
    room: &mut Room,
    patch: RoomPatch,
    now: Timestamp,
) -> Result<(), StoreError> {
    if let Some(expected) = patch.expected_status
        && room.status != expected
    {
        return Err(StoreError::Conflict(format!(
            "{} is {}, expected {}",
            room_key(&room.id),
            room.status,
            expected
        )));
    }
    // ended is terminal
    if room.status == RoomStatus::Ended && (patch.status.is_some() || patch.stamp_ended_at) {
        return Err(StoreError::Conflict(format!(
            "{} has already ended",
            room_key(&room.id)
        )));
    }

    if let Some(status) = patch.status {
        room.status = status;
    }
    if patch.stamp_ended_at {
        room.ended_at = Some(now);
    }
    Ok(())
}

fn apply_participant_patch(participant: &mut Participant, patch: ParticipantPatch, now: Timestamp) {
    if let Some(name) = patch.name {
        participant.name = name;
    }
    if let Some(card) = patch.selected_card {
        participant.selected_card = card;
    }
    if let Some(online) = patch.online {
        participant.online = online;
    }
    if patch.touch_last_seen {
        participant.last_seen_at = now;
    }
}

/// watch チャンネルを「現在値 + 変更ごとの最新値」のストリームに変換
fn watch_stream<T>(rx: watch::Receiver<T>) -> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let value = rx.borrow_and_update().clone();
        Some((value, (rx, false)))
    })
    .boxed()
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn create_room(&self, room: NewRoom) -> Result<Room, StoreError> {
        let room_id = room.id.clone();
        self.apply(WriteBatch::new().create_room(room)).await?;
        self.get_room(&room_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(room_key(&room_id)))
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.tables.rooms.get(room_id).map(|e| e.room.clone()))
    }

    async fn update_room(&self, room_id: &RoomId, patch: RoomPatch) -> Result<(), StoreError> {
        self.apply(WriteBatch::new().update_room(room_id.clone(), patch))
            .await
            .map(|_| ())
    }

    async fn list_rooms(&self, limit: usize) -> Result<Vec<Room>, StoreError> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<&RoomEntry> = inner.tables.rooms.values().collect();
        entries.sort_by(|a, b| {
            b.room
                .created_at
                .cmp(&a.room.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(entries
            .into_iter()
            .take(limit)
            .map(|e| e.room.clone())
            .collect())
    }

    async fn get_participant(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<Option<Participant>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .rooms
            .get(room_id)
            .and_then(|e| e.participants.get(participant_id))
            .cloned())
    }

    async fn list_participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .rooms
            .get(room_id)
            .map(participant_snapshot)
            .unwrap_or_default())
    }

    async fn set_participant(
        &self,
        room_id: &RoomId,
        participant: NewParticipant,
    ) -> Result<(), StoreError> {
        self.apply(WriteBatch::new().set_participant(room_id.clone(), participant))
            .await
            .map(|_| ())
    }

    async fn update_participant(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        patch: ParticipantPatch,
    ) -> Result<(), StoreError> {
        self.apply(WriteBatch::new().update_participant(
            room_id.clone(),
            participant_id.clone(),
            patch,
        ))
        .await
        .map(|_| ())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.apply(batch).await.map(|_| ())
    }

    async fn subscribe_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription<Option<Room>>, StoreError> {
        let rx = self.watchers_for(room_id, |w| w.room.subscribe()).await;
        tracing::debug!("New room subscription for {}", room_id);
        Ok(watch_stream(rx))
    }

    async fn subscribe_participants(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription<Vec<Participant>>, StoreError> {
        let rx = self
            .watchers_for(room_id, |w| w.participants.subscribe())
            .await;
        tracing::debug!("New participants subscription for {}", room_id);
        Ok(watch_stream(rx))
    }

    async fn add_vote_result(&self, result: NewVoteResult) -> Result<VoteResult, StoreError> {
        let touched = self
            .apply(WriteBatch::new().add_vote_result(result))
            .await?;
        touched
            .into_iter()
            .find_map(|t| match t {
                Touched::VoteResult(record) => Some(record),
                Touched::Room(_) | Touched::Participants(_) => None,
            })
            .ok_or_else(|| StoreError::Invalid("vote result was not recorded".to_string()))
    }

    async fn list_vote_results(&self, limit: usize) -> Result<Vec<VoteResult>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .vote_results
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, ParticipantName, RankedCard, Topic};
    use yoriai_shared::time::ManualClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomStore の基本的な読み書き
    // - サーバー時刻の付与
    // - バッチ書き込みのアトミック性（全適用 or 全破棄）
    // - 購読ストリームへのスナップショット配信
    //
    // 【なぜこのテストが必要か】
    // - セッションの整合性はストアのドキュメント単位・バッチ単位のアトミック性に依存する
    // - リセット時に「状態は voting なのに古い票が残る」スナップショットを防ぐ必要がある
    // ========================================

    fn room_id() -> RoomId {
        RoomId::new("ROOM42".to_string()).unwrap()
    }

    fn pid(value: &str) -> ParticipantId {
        ParticipantId::new(value.to_string()).unwrap()
    }

    fn new_room() -> NewRoom {
        NewRoom {
            id: room_id(),
            host_id: pid("host"),
            topic: Topic::new("Hiring policy".to_string()).unwrap(),
        }
    }

    fn new_participant(id: &str) -> NewParticipant {
        NewParticipant {
            id: pid(id),
            name: ParticipantName::new(id.to_string()).unwrap(),
        }
    }

    fn create_test_store() -> (InMemoryRoomStore, ManualClock) {
        let clock = ManualClock::new(1_000);
        (InMemoryRoomStore::new(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_create_room_stamps_server_time_and_starts_voting() {
        // テスト項目: Room 作成時にサーバー時刻が付与され、状態は voting で始まる
        // given (前提条件):
        let (store, _clock) = create_test_store();

        // when (操作):
        let room = store.create_room(new_room()).await.unwrap();

        // then (期待する結果):
        assert_eq!(room.status, RoomStatus::Voting);
        assert_eq!(room.created_at, Timestamp::new(1_000));
        assert_eq!(room.ended_at, None);
    }

    #[tokio::test]
    async fn test_create_room_rejects_duplicate_id() {
        // テスト項目: 同じ ID の Room を二重に作成するとエラーになる
        // given (前提条件):
        let (store, _clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();

        // when (操作):
        let result = store.create_room(new_room()).await;

        // then (期待する結果):
        assert_eq!(result, Err(StoreError::AlreadyExists("rooms/ROOM42".to_string())));
    }

    #[tokio::test]
    async fn test_update_missing_participant_is_not_found() {
        // テスト項目: 存在しない参加者の更新は NotFound になる
        // given (前提条件):
        let (store, _clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();

        // when (操作):
        let result = store
            .update_participant(&room_id(), &pid("ghost"), ParticipantPatch::heartbeat())
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(StoreError::NotFound(
                "rooms/ROOM42/participants/ghost".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_heartbeat_touches_last_seen_with_server_time() {
        // テスト項目: 生存通知で last_seen_at がサーバー時刻に更新される
        // given (前提条件):
        let (store, clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();
        store
            .set_participant(&room_id(), new_participant("alice"))
            .await
            .unwrap();
        store
            .update_participant(&room_id(), &pid("alice"), ParticipantPatch::offline())
            .await
            .unwrap();
        clock.advance(5_000);

        // when (操作):
        store
            .update_participant(&room_id(), &pid("alice"), ParticipantPatch::heartbeat())
            .await
            .unwrap();

        // then (期待する結果):
        let alice = store
            .get_participant(&room_id(), &pid("alice"))
            .await
            .unwrap()
            .unwrap();
        assert!(alice.online);
        assert_eq!(alice.last_seen_at, Timestamp::new(6_000));
    }

    #[tokio::test]
    async fn test_server_timestamps_never_go_backwards() {
        // テスト項目: 時計が巻き戻ってもサーバー時刻は単調に増加する
        // given (前提条件):
        let (store, clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();
        clock.set(500);

        // when (操作):
        store
            .set_participant(&room_id(), new_participant("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        let alice = store
            .get_participant(&room_id(), &pid("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alice.last_seen_at, Timestamp::new(1_000));
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_store_untouched() {
        // テスト項目: バッチ内の 1 操作が失敗すると、先行する操作も適用されない
        // given (前提条件):
        let (store, _clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();
        store
            .set_participant(&room_id(), new_participant("alice"))
            .await
            .unwrap();
        store
            .update_participant(
                &room_id(),
                &pid("alice"),
                ParticipantPatch::vote(Some(Card::new(4).unwrap())),
            )
            .await
            .unwrap();

        // when (操作):
        let batch = WriteBatch::new()
            .update_room(room_id(), RoomPatch::status(RoomStatus::Revealed))
            .update_participant(room_id(), pid("alice"), ParticipantPatch::vote(None))
            .update_participant(room_id(), pid("ghost"), ParticipantPatch::vote(None));
        let result = store.commit(batch).await;

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        let room = store.get_room(&room_id()).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Voting);
        let alice = store
            .get_participant(&room_id(), &pid("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alice.selected_card, Some(Card::new(4).unwrap()));
    }

    #[tokio::test]
    async fn test_subscription_delivers_current_value_then_changes() {
        // テスト項目: 購読直後に現在値、変更後に最新値が届く
        // given (前提条件):
        let (store, _clock) = create_test_store();
        let mut rooms = store.subscribe_room(&room_id()).await.unwrap();
        let mut participants = store.subscribe_participants(&room_id()).await.unwrap();

        // when (操作) / then (期待する結果): まだ存在しない
        assert_eq!(rooms.next().await, Some(None));
        assert_eq!(participants.next().await, Some(vec![]));

        store.create_room(new_room()).await.unwrap();
        let room = rooms.next().await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Voting);

        store
            .set_participant(&room_id(), new_participant("bob"))
            .await
            .unwrap();
        let snapshot = participants.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, pid("bob"));
    }

    #[tokio::test]
    async fn test_batch_is_published_as_single_snapshot() {
        // テスト項目: バッチの結果は 1 つのスナップショットとして届き、途中状態は見えない
        // given (前提条件):
        let (store, _clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();
        for id in ["alice", "bob"] {
            store
                .set_participant(&room_id(), new_participant(id))
                .await
                .unwrap();
            store
                .update_participant(
                    &room_id(),
                    &pid(id),
                    ParticipantPatch::vote(Some(Card::new(2).unwrap())),
                )
                .await
                .unwrap();
        }
        let mut participants = store.subscribe_participants(&room_id()).await.unwrap();
        let before = participants.next().await.unwrap();
        assert!(before.iter().all(|p| p.selected_card.is_some()));

        // when (操作):
        let batch = WriteBatch::new()
            .update_participant(room_id(), pid("alice"), ParticipantPatch::vote(None))
            .update_participant(room_id(), pid("bob"), ParticipantPatch::vote(None));
        store.commit(batch).await.unwrap();

        // then (期待する結果):
        let after = participants.next().await.unwrap();
        assert!(after.iter().all(|p| p.selected_card.is_none()));
    }

    #[tokio::test]
    async fn test_ended_room_rejects_status_change() {
        // テスト項目: ended の Room は状態を変更できず、ended_at も保持される
        // given (前提条件):
        let (store, clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();
        store
            .update_room(&room_id(), RoomPatch::status(RoomStatus::Ended))
            .await
            .unwrap();
        clock.advance(1_000);

        // when (操作):
        let reopen = store
            .update_room(&room_id(), RoomPatch::status(RoomStatus::Voting))
            .await;
        let end_again = store
            .update_room(&room_id(), RoomPatch::status(RoomStatus::Ended))
            .await;

        // then (期待する結果):
        assert!(matches!(reopen, Err(StoreError::Conflict(_))));
        assert!(matches!(end_again, Err(StoreError::Conflict(_))));
        let room = store.get_room(&room_id()).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Ended);
        assert_eq!(room.ended_at, Some(Timestamp::new(1_000)));
    }

    #[tokio::test]
    async fn test_expected_status_mismatch_discards_whole_batch() {
        // テスト項目: 前提の状態が一致しない遷移はバッチごと破棄される
        // given (前提条件):
        let (store, _clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();
        store
            .set_participant(&room_id(), new_participant("alice"))
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

        // when (操作): voting のまま revealed → voting のリセットを試みる
        let batch = WriteBatch::new()
            .update_room(
                room_id(),
                RoomPatch::transition(RoomStatus::Revealed, RoomStatus::Voting),
            )
            .update_participant(room_id(), pid("alice"), ParticipantPatch::vote(None));
        let result = store.commit(batch).await;

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        let alice = store
            .get_participant(&room_id(), &pid("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alice.selected_card, Some(Card::new(6).unwrap()));
    }

    #[tokio::test]
    async fn test_participant_write_does_not_push_room_snapshot() {
        // テスト項目: 参加者の書き込みでは Room の購読に通知されない
        // given (前提条件):
        let (store, _clock) = create_test_store();
        store.create_room(new_room()).await.unwrap();
        store
            .set_participant(&room_id(), new_participant("alice"))
            .await
            .unwrap();
        let mut rooms = store.subscribe_room(&room_id()).await.unwrap();
        let mut participants = store.subscribe_participants(&room_id()).await.unwrap();
        rooms.next().await.unwrap();
        participants.next().await.unwrap();

        // when (操作):
        store
            .update_participant(&room_id(), &pid("alice"), ParticipantPatch::heartbeat())
            .await
            .unwrap();

        // then (期待する結果):
        let pushed = tokio::time::timeout(std::time::Duration::from_millis(100), rooms.next()).await;
        assert!(pushed.is_err(), "room snapshot was pushed for a heartbeat");
        let snapshot = participants.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_list_rooms_newest_first_with_limit() {
        // テスト項目: Room 一覧は新しい順で件数制限される
        // given (前提条件):
        let (store, clock) = create_test_store();
        for code in ["AAAAAA", "BBBBBB", "CCCCCC"] {
            store
                .create_room(NewRoom {
                    id: RoomId::new(code.to_string()).unwrap(),
                    host_id: pid("host"),
                    topic: Topic::new("t".to_string()).unwrap(),
                })
                .await
                .unwrap();
            clock.advance(10);
        }

        // when (操作):
        let rooms = store.list_rooms(2).await.unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["CCCCCC", "BBBBBB"]);
    }

    #[tokio::test]
    async fn test_vote_results_newest_first() {
        // テスト項目: 投票結果は新しい順に取得できる
        // given (前提条件):
        let (store, clock) = create_test_store();
        for topic in ["first", "second"] {
            store
                .add_vote_result(NewVoteResult {
                    room_id: room_id(),
                    topic: Topic::new(topic.to_string()).unwrap(),
                    results: vec![RankedCard {
                        card: Card::new(3).unwrap(),
                        count: 1,
                        rank: 1,
                    }],
                })
                .await
                .unwrap();
            clock.advance(10);
        }

        // when (操作):
        let results = store.list_vote_results(10).await.unwrap();

        // then (期待する結果):
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].topic.as_str(), "second");
        assert_eq!(results[1].voted_at, Timestamp::new(1_000));
    }
}
