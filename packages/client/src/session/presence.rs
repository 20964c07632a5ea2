//! Presence Tracker
//!
//! 参加中の Room で自分の在室状態を書き込み続けます。
//!
//! - 一定間隔のハートビート（失敗はログのみで、間隔は止めない）
//! - 非表示になったら即オフライン、再表示で即オンライン
//! - 終了時はベストエフォートでオフライン
//! - `retire` 後はハートビートを再開しない

use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle, time::MissedTickBehavior};
use yoriai_server::{
    domain::{ParticipantId, RoomId},
    usecase::{PresenceError, PresenceUseCase},
};

/// ハートビートタスクの状態
#[derive(Default)]
struct Heartbeat {
    handle: Option<JoinHandle<()>>,
    retired: bool,
}

pub struct PresenceTracker {
    room_id: RoomId,
    participant_id: ParticipantId,
    usecase: Arc<PresenceUseCase>,
    interval: Duration,
    heartbeat: Mutex<Heartbeat>,
}

impl PresenceTracker {
    pub fn new(
        room_id: RoomId,
        participant_id: ParticipantId,
        usecase: Arc<PresenceUseCase>,
        interval: Duration,
    ) -> Self {
        Self {
            room_id,
            participant_id,
            usecase,
            interval,
            heartbeat: Mutex::new(Heartbeat::default()),
        }
    }

    /// ハートビートを開始する（すでに動いている、または retire 済みなら何もしない）
    pub async fn start(&self) {
        let mut heartbeat = self.heartbeat.lock().await;
        if heartbeat.handle.is_some() || heartbeat.retired {
            return;
        }

        let usecase = self.usecase.clone();
        let room_id = self.room_id.clone();
        let participant_id = self.participant_id.clone();
        let period = self.interval;
        heartbeat.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = usecase.heartbeat(&room_id, &participant_id).await {
                    tracing::warn!("Heartbeat for {} failed: {}", room_id, e);
                }
            }
        }));
        tracing::debug!("Heartbeat started every {:?}", period);
    }

    /// ハートビートを止める
    pub async fn stop(&self) {
        if let Some(handle) = self.heartbeat.lock().await.handle.take() {
            handle.abort();
            tracing::debug!("Heartbeat stopped");
        }
    }

    /// ハートビートを止め、以降の `start` を無効にする
    pub async fn retire(&self) {
        let mut heartbeat = self.heartbeat.lock().await;
        heartbeat.retired = true;
        if let Some(handle) = heartbeat.handle.take() {
            handle.abort();
            tracing::debug!("Heartbeat retired");
        }
    }

    /// 画面が非表示になった
    pub async fn on_hidden(&self) -> Result<(), PresenceError> {
        self.stop().await;
        self.usecase
            .mark_offline(&self.room_id, &self.participant_id)
            .await
    }

    /// 画面が再表示された
    pub async fn on_visible(&self) -> Result<(), PresenceError> {
        self.usecase
            .heartbeat(&self.room_id, &self.participant_id)
            .await?;
        self.start().await;
        Ok(())
    }

    /// Room を離れる（ベストエフォートのオフライン申告）
    pub async fn leave(&self) {
        self.retire().await;
        if let Err(e) = self
            .usecase
            .mark_offline(&self.room_id, &self.participant_id)
            .await
        {
            tracing::warn!("Failed to mark offline on leave: {}", e);
        }
    }

    pub(crate) fn abort(&self) {
        if let Ok(mut heartbeat) = self.heartbeat.try_lock()
            && let Some(handle) = heartbeat.handle.take()
        {
            handle.abort();
        }
    }
}

impl Drop for PresenceTracker {
    fn drop(&mut self) {
        self.abort();
    }
}
