//! ID 生成
//!
//! Room ID はクライアント側で生成し、ストアとの重複確認は行いません（衝突確率は無視できる）。

use rand::{Rng, distributions::Alphanumeric};
use uuid::Uuid;

use super::{
    error::ValueObjectError,
    value_object::{ParticipantId, ROOM_ID_LEN, RoomId},
};

/// Room ID のファクトリ
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// 6 文字の英大文字・数字からなる Room ID を生成
    pub fn generate() -> Result<RoomId, ValueObjectError> {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ROOM_ID_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        RoomId::new(code)
    }
}

/// 参加者 ID のファクトリ
pub struct ParticipantIdFactory;

impl ParticipantIdFactory {
    /// UUID v4 から参加者 ID を生成
    pub fn generate() -> Result<ParticipantId, ValueObjectError> {
        ParticipantId::new(Uuid::new_v4().to_string())
    }
}
