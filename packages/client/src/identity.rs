//! Identity Provider
//!
//! 参加者 ID と「自分がホストである Room」をローカルのキーバリューストアに記憶します。
//!
//! ## キー
//!
//! ```text
//! participant-id        初回利用時に生成した UUID v4
//! host-id:{roomId}      Room を作成した場合のみ、そのホスト ID
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use yoriai_server::domain::{ParticipantId, ParticipantIdFactory, Room, RoomId};

use crate::error::ClientError;

const PARTICIPANT_ID_KEY: &str = "participant-id";
const IDENTITY_FILE_NAME: &str = "identity.json";

fn host_key(room_id: &RoomId) -> String {
    format!("host-id:{}", room_id)
}

/// ローカルのキーバリューストア（ネットワークなし）
pub trait LocalStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, value: &str) -> Result<(), ClientError>;
}

/// データディレクトリ内の `identity.json` に保存するストア
pub struct FileLocalStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileLocalStore {
    /// データディレクトリを開く（なければ作成）
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, ClientError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(IDENTITY_FILE_NAME);

        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            BTreeMap::new()
        };
        tracing::debug!("Opened identity store at {}", path.display());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalStore for FileLocalStore {
    fn load(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ClientError::Identity("identity store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&*entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// テスト用のメモリ上のストア
#[derive(Default)]
pub struct InMemoryLocalStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for InMemoryLocalStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Identity("identity store lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 参加者 ID とホスト記憶の提供
#[derive(Clone)]
pub struct IdentityProvider {
    store: Arc<dyn LocalStore>,
}

impl IdentityProvider {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// 記憶している参加者 ID を返す。なければ生成して保存する。
    pub fn participant_id(&self) -> Result<ParticipantId, ClientError> {
        if let Some(raw) = self.store.load(PARTICIPANT_ID_KEY) {
            match ParticipantId::new(raw) {
                Ok(id) => return Ok(id),
                Err(e) => tracing::warn!("Stored participant id is invalid, regenerating: {}", e),
            }
        }

        let id = ParticipantIdFactory::generate()
            .map_err(|e| ClientError::Identity(e.to_string()))?;
        self.store.store(PARTICIPANT_ID_KEY, id.as_str())?;
        tracing::info!("Generated participant id {}", id);
        Ok(id)
    }

    /// Room の作成者として自分のホスト ID を記憶する
    pub fn remember_host(
        &self,
        room_id: &RoomId,
        host_id: &ParticipantId,
    ) -> Result<(), ClientError> {
        self.store.store(&host_key(room_id), host_id.as_str())
    }

    /// 記憶しているホスト ID
    pub fn host_id(&self, room_id: &RoomId) -> Option<ParticipantId> {
        self.store
            .load(&host_key(room_id))
            .and_then(|raw| ParticipantId::new(raw).ok())
    }

    /// 記憶しているホスト ID が Room の `host_id` と一致するか
    pub fn is_host(&self, room: &Room) -> bool {
        self.host_id(&room.id)
            .is_some_and(|id| room.is_hosted_by(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yoriai_server::domain::{RoomStatus, Timestamp, Topic};

    fn room(code: &str, host: &str) -> Room {
        Room {
            id: RoomId::new(code.to_string()).unwrap(),
            status: RoomStatus::Voting,
            host_id: ParticipantId::new(host.to_string()).unwrap(),
            topic: Topic::new("topic".to_string()).unwrap(),
            created_at: Timestamp::new(0),
            ended_at: None,
        }
    }

    #[test]
    fn test_participant_id_is_generated_once() {
        // テスト項目: 参加者 ID は初回に生成され、以降は同じ値が返る
        // given (前提条件):
        let identity = IdentityProvider::new(Arc::new(InMemoryLocalStore::new()));

        // when (操作):
        let first = identity.participant_id().unwrap();
        let second = identity.participant_id().unwrap();

        // then (期待する結果):
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_host_only_for_remembered_room() {
        // テスト項目: ホスト判定は記憶した Room かつ host_id が一致する場合のみ真
        // given (前提条件):
        let identity = IdentityProvider::new(Arc::new(InMemoryLocalStore::new()));
        let me = identity.participant_id().unwrap();
        let mine = room("MINE01", me.as_str());
        identity.remember_host(&mine.id, &me).unwrap();

        // when (操作):
        let other = room("OTHER1", me.as_str());
        let forged = room("MINE01", "someone-else");

        // then (期待する結果):
        assert!(identity.is_host(&mine));
        assert!(!identity.is_host(&other));
        assert!(!identity.is_host(&forged));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        // テスト項目: ファイルストアに保存した ID は再オープン後も読める
        // given (前提条件):
        let dir = std::env::temp_dir().join(format!("yoriai-identity-{}", uuid::Uuid::new_v4()));
        let first = {
            let store = FileLocalStore::open(&dir).unwrap();
            IdentityProvider::new(Arc::new(store))
                .participant_id()
                .unwrap()
        };

        // when (操作):
        let reopened = FileLocalStore::open(&dir).unwrap();
        let second = IdentityProvider::new(Arc::new(reopened))
            .participant_id()
            .unwrap();

        // then (期待する結果):
        assert_eq!(first, second);
        std::fs::remove_dir_all(&dir).ok();
    }
}
