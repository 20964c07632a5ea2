//! UseCase: 参加可能な Room 一覧の取得
//!
//! ストアから新しい順に件数制限付きで取得し、終了済みの Room を除外します。

use std::sync::Arc;

use crate::domain::{Room, RoomStatus, RoomStore};

use super::error::ListError;

/// 一覧取得のデフォルト件数
pub const DEFAULT_ROOM_LIST_LIMIT: usize = 20;

/// 参加可能な Room 一覧取得のユースケース
pub struct GetOpenRoomsUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn RoomStore>,
}

impl GetOpenRoomsUseCase {
    /// 新しい GetOpenRoomsUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// 一覧取得を実行
    ///
    /// 件数制限はストアへの問い合わせに適用されるため、終了済みを除外した結果は
    /// `limit` 件より少なくなることがあります。
    pub async fn execute(&self, limit: usize) -> Result<Vec<Room>, ListError> {
        let rooms = self.store.list_rooms(limit).await?;
        Ok(rooms
            .into_iter()
            .filter(|room| room.status != RoomStatus::Ended)
            .collect())
    }
}
