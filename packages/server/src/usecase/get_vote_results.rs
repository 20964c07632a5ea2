//! UseCase: 過去の投票結果の取得

use std::sync::Arc;

use crate::domain::{RoomStore, VoteResult};

use super::error::ListError;

/// 履歴取得のデフォルト件数
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// 投票結果履歴取得のユースケース
pub struct GetVoteResultsUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn RoomStore>,
}

impl GetVoteResultsUseCase {
    /// 新しい GetVoteResultsUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// 新しい順に最大 `limit` 件を取得
    pub async fn execute(&self, limit: usize) -> Result<Vec<VoteResult>, ListError> {
        Ok(self.store.list_vote_results(limit).await?)
    }
}
