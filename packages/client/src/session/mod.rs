//! Room Synchronization Engine
//!
//! `RoomSession` は Room 画面 1 回分のスコープを持つオブジェクトです。
//! 作成時に参加者ドキュメントを作成（または更新）し、Room と参加者一覧の 2 つの購読と
//! ハートビートを所有します。終了時（`close` または drop）にすべて破棄します。
//!
//! ## データフロー
//!
//! ```text
//! コマンド → RoomSession → UseCase → RoomStore
//!                 ↑                       │
//!             スナップショット ←── 購読 ─────┘
//! ```
//!
//! 表示用の状態（`RoomView`）は最新のスナップショットから呼び出しのたびに導出します。
//! Room と参加者一覧の到着順はそろっている前提を置きません。

mod lobby;
pub mod presence;
pub mod view;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures_util::StreamExt;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use yoriai_server::{
    domain::{
        Card, HostCommand, Participant, ParticipantId, ParticipantName, PresencePolicy, Room,
        RoomId, RoomStatus, RoomStore, Subscription, Timestamp, ValueObjectError,
        state_machine::is_host,
    },
    usecase::{HostCommandUseCase, JoinRoomUseCase, PresenceUseCase, SelectCardUseCase},
};
use yoriai_shared::time::Clock;

use crate::{error::SessionError, identity::IdentityProvider};

pub use lobby::Lobby;
use presence::PresenceTracker;
pub use view::{ParticipantView, RoomView, derive_view};

/// Engine tuning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub presence: PresencePolicy,
}

impl SessionConfig {
    pub fn new(
        heartbeat_interval: Duration,
        offline_threshold: Duration,
    ) -> Result<Self, ValueObjectError> {
        Ok(Self {
            presence: PresencePolicy::new(heartbeat_interval, offline_threshold)?,
        })
    }
}

/// Asynchronous notices from the session driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The host ended the room. Sent once; the session accepts no more commands.
    RoomEnded,
    /// The room document disappeared.
    RoomNotFound,
    /// A subscription stream ended (reconnects exhausted).
    Disconnected,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    room: Option<Room>,
    participants: Vec<Participant>,
}

/// Resets the in-flight flag even if the command future is dropped.
struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RoomSession {
    room_id: RoomId,
    participant_id: ParticipantId,
    /// この Room について記憶しているホスト ID
    remembered_host: Option<ParticipantId>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    join_usecase: JoinRoomUseCase,
    select_card_usecase: SelectCardUseCase,
    host_command_usecase: HostCommandUseCase,
    presence_usecase: Arc<PresenceUseCase>,
    presence: Arc<PresenceTracker>,
    snapshot_rx: watch::Receiver<Snapshot>,
    is_submitting: AtomicBool,
    terminated: Arc<AtomicBool>,
    driver: JoinHandle<()>,
    closed: bool,
}

impl RoomSession {
    /// Room に入る
    ///
    /// 参加者ドキュメントを作成または更新し、購読とハートビートを開始します。
    /// 返り値の受信側には `SessionEvent` が届きます。
    pub async fn enter(
        store: Arc<dyn RoomStore>,
        identity: &IdentityProvider,
        room_id: RoomId,
        name: ParticipantName,
        config: SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>), SessionError> {
        let participant_id = identity.participant_id()?;
        let remembered_host = identity.host_id(&room_id);

        // 1. 参加（作成または再入室）
        let join_usecase = JoinRoomUseCase::new(store.clone());
        let outcome = join_usecase
            .execute(&room_id, &participant_id, name)
            .await?;
        tracing::info!(
            "{} room {} as '{}'",
            if outcome.rejoined { "Rejoined" } else { "Joined" },
            room_id,
            participant_id
        );

        // 2. 購読
        let rooms = store.subscribe_room(&room_id).await?;
        let participants = store.subscribe_participants(&room_id).await?;

        // 3. ハートビート
        let presence_usecase = Arc::new(PresenceUseCase::new(store.clone()));
        let presence = Arc::new(PresenceTracker::new(
            room_id.clone(),
            participant_id.clone(),
            presence_usecase.clone(),
            config.presence.heartbeat_interval(),
        ));
        presence.start().await;

        // 4. ドライバ
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot {
            room: Some(outcome.room),
            participants: Vec::new(),
        });
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let terminated = Arc::new(AtomicBool::new(false));
        let driver = tokio::spawn(drive(
            rooms,
            participants,
            snapshot_tx,
            event_tx,
            terminated.clone(),
            presence.clone(),
        ));

        let session = Self {
            room_id,
            participant_id,
            remembered_host,
            config,
            clock,
            join_usecase,
            select_card_usecase: SelectCardUseCase::new(store.clone()),
            host_command_usecase: HostCommandUseCase::new(store),
            presence_usecase,
            presence,
            snapshot_rx,
            is_submitting: AtomicBool::new(false),
            terminated,
            driver,
            closed: false,
        };
        Ok((session, event_rx))
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    /// 終了済み（Room の終了、消失、切断）
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// 最新の Room に対してホストとして操作できるか
    pub fn is_host(&self) -> bool {
        self.snapshot_rx
            .borrow()
            .room
            .as_ref()
            .is_some_and(|room| is_host(room, self.remembered_host.as_ref()))
    }

    /// 最新のスナップショットから現在時刻で表示状態を導出する
    pub fn view(&self) -> Option<RoomView> {
        let snapshot = self.snapshot_rx.borrow();
        let room = snapshot.room.as_ref()?;
        Some(derive_view(
            room,
            &snapshot.participants,
            &self.participant_id,
            is_host(room, self.remembered_host.as_ref()),
            Timestamp::new(self.clock.now_millis()),
            &self.config.presence,
        ))
    }

    /// 次のスナップショット更新を待つ。ドライバが止まっていれば `false`。
    pub async fn changed(&mut self) -> bool {
        self.snapshot_rx.changed().await.is_ok()
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_terminated() {
            return Err(SessionError::Terminated);
        }
        Ok(())
    }

    /// 参加者ドキュメントの作成または更新（表示名の変更にも使う）
    pub async fn join(&self, name: ParticipantName) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.join_usecase
            .execute(&self.room_id, &self.participant_id, name)
            .await?;
        Ok(())
    }

    /// カードを選ぶ。同じカードなら取り消し。
    ///
    /// 前の選択の書き込みが終わるまでは `SessionError::Busy` を返します。
    pub async fn select_card(&self, card: Card) -> Result<Option<Card>, SessionError> {
        self.ensure_active()?;
        if self
            .is_submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::Busy);
        }
        let _guard = SubmittingGuard(&self.is_submitting);

        let selected = self
            .select_card_usecase
            .execute(&self.room_id, &self.participant_id, card)
            .await?;
        Ok(selected)
    }

    pub async fn reveal(&self) -> Result<RoomStatus, SessionError> {
        self.host_command(HostCommand::Reveal).await
    }

    /// 全員の投票を取り消して次のラウンドへ。確認は呼び出し側の責務。
    pub async fn reset_round(&self) -> Result<RoomStatus, SessionError> {
        self.host_command(HostCommand::ResetRound).await
    }

    pub async fn end_room(&self) -> Result<RoomStatus, SessionError> {
        self.host_command(HostCommand::EndRoom).await
    }

    async fn host_command(&self, command: HostCommand) -> Result<RoomStatus, SessionError> {
        self.ensure_active()?;
        // ホストでなければ書き込みを試みない
        if !self.is_host() {
            tracing::warn!("Refused to {}: not the host", command.action());
            return Err(SessionError::NotHost(command.action()));
        }

        let status = self
            .host_command_usecase
            .execute(&self.room_id, self.remembered_host.as_ref(), command)
            .await?;
        Ok(status)
    }

    /// 表示状態の切り替え（非表示で即オフライン、再表示で即オンライン）
    pub async fn set_visible(&self, visible: bool) -> Result<(), SessionError> {
        self.ensure_active()?;
        if visible {
            self.presence.on_visible().await?;
        } else {
            self.presence.on_hidden().await?;
        }
        Ok(())
    }

    /// 購読とハートビートを止め、オフラインを申告して終了する
    pub async fn close(mut self) {
        self.closed = true;
        self.driver.abort();
        self.presence.leave().await;
        tracing::info!("Left room {}", self.room_id);
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.driver.abort();
        if self.closed {
            return;
        }
        self.presence.abort();

        // ベストエフォートのオフライン申告
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let usecase = self.presence_usecase.clone();
            let room_id = self.room_id.clone();
            let participant_id = self.participant_id.clone();
            runtime.spawn(async move {
                if let Err(e) = usecase.mark_offline(&room_id, &participant_id).await {
                    tracing::debug!("Offline on teardown failed: {}", e);
                }
            });
        }
    }
}

async fn drive(
    mut rooms: Subscription<Option<Room>>,
    mut participants: Subscription<Vec<Participant>>,
    snapshot_tx: watch::Sender<Snapshot>,
    events: mpsc::UnboundedSender<SessionEvent>,
    terminated: Arc<AtomicBool>,
    presence: Arc<PresenceTracker>,
) {
    let event = loop {
        tokio::select! {
            next = rooms.next() => match next {
                Some(Some(room)) => {
                    let ended = room.status == RoomStatus::Ended;
                    snapshot_tx.send_modify(|s| s.room = Some(room));
                    if ended {
                        break SessionEvent::RoomEnded;
                    }
                }
                Some(None) => {
                    snapshot_tx.send_modify(|s| s.room = None);
                    break SessionEvent::RoomNotFound;
                }
                None => break SessionEvent::Disconnected,
            },
            next = participants.next() => match next {
                Some(list) => snapshot_tx.send_modify(|s| s.participants = list),
                None => break SessionEvent::Disconnected,
            },
        }
    };

    terminated.store(true, Ordering::Release);
    presence.retire().await;
    tracing::info!("Room session terminated: {:?}", event);
    let _ = events.send(event);
}
