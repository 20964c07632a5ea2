//! Entry screen operations: create, list, history, enter.

use std::sync::Arc;

use tokio::sync::mpsc;
use yoriai_server::{
    domain::{ParticipantName, Room, RoomId, RoomStore, Topic, VoteResult},
    usecase::{CreateRoomUseCase, GetOpenRoomsUseCase, GetVoteResultsUseCase},
};
use yoriai_shared::time::Clock;

use crate::{error::SessionError, identity::IdentityProvider};

use super::{RoomSession, SessionConfig, SessionEvent};

pub struct Lobby {
    store: Arc<dyn RoomStore>,
    identity: IdentityProvider,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    create_room_usecase: CreateRoomUseCase,
    get_open_rooms_usecase: GetOpenRoomsUseCase,
    get_vote_results_usecase: GetVoteResultsUseCase,
}

impl Lobby {
    pub fn new(
        store: Arc<dyn RoomStore>,
        identity: IdentityProvider,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            create_room_usecase: CreateRoomUseCase::new(store.clone()),
            get_open_rooms_usecase: GetOpenRoomsUseCase::new(store.clone()),
            get_vote_results_usecase: GetVoteResultsUseCase::new(store.clone()),
            store,
            identity,
            clock,
            config,
        }
    }

    pub fn identity(&self) -> &IdentityProvider {
        &self.identity
    }

    /// Room を作成し、自分をホストとして記憶する
    pub async fn create_room(&self, host_name: &str, topic: &str) -> Result<Room, SessionError> {
        let host_name = ParticipantName::new(host_name.to_string())?;
        let topic = Topic::new(topic.to_string())?;
        let host_id = self.identity.participant_id()?;

        let room = self
            .create_room_usecase
            .execute(host_id.clone(), host_name, topic)
            .await?;
        self.identity.remember_host(&room.id, &host_id)?;
        tracing::info!("Created room {} as host", room.id);
        Ok(room)
    }

    /// 参加可能な Room（終了済みを除く）
    pub async fn open_rooms(&self, limit: usize) -> Result<Vec<Room>, SessionError> {
        Ok(self.get_open_rooms_usecase.execute(limit).await?)
    }

    /// 過去の投票結果（新しい順）
    pub async fn history(&self, limit: usize) -> Result<Vec<VoteResult>, SessionError> {
        Ok(self.get_vote_results_usecase.execute(limit).await?)
    }

    /// Room に入る
    pub async fn enter(
        &self,
        room_id: &str,
        name: &str,
    ) -> Result<(RoomSession, mpsc::UnboundedReceiver<SessionEvent>), SessionError> {
        let room_id = RoomId::new(room_id.to_string())?;
        let name = ParticipantName::new(name.to_string())?;
        RoomSession::enter(
            self.store.clone(),
            &self.identity,
            room_id,
            name,
            self.config,
            self.clock.clone(),
        )
        .await
    }
}
