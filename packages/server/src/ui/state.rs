//! Server state.

use std::sync::Arc;

use crate::domain::RoomStore;

/// Shared application state
pub struct AppState {
    /// Store（データアクセス層の抽象化）
    pub store: Arc<dyn RoomStore>,
}
