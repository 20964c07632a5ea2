//! Value Object 定義
//!
//! ドメインで扱う値はすべて生成時に検証し、以降は不変として扱います。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// Room ID の長さ
pub const ROOM_ID_LEN: usize = 6;
/// 参加者名の最大文字数
pub const MAX_NAME_CHARS: usize = 20;
/// トピックの最大文字数
pub const MAX_TOPIC_CHARS: usize = 100;

/// Room ID（6 文字の英大文字・数字）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// 入力を大文字化してから検証します。
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_ascii_uppercase();
        let valid = value.len() == ROOM_ID_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !valid {
            return Err(ValueObjectError::InvalidRoomId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 参加者 ID（クライアント側で生成される永続的な識別子）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let valid = !value.is_empty()
            && value.len() <= 64
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ValueObjectError::InvalidParticipantId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ParticipantId> for String {
    fn from(value: ParticipantId) -> Self {
        value.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 表示名（前後の空白を除いて 1〜20 文字、重複可）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantName(String);

impl ParticipantName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        let chars = trimmed.chars().count();
        if chars == 0 || chars > MAX_NAME_CHARS {
            return Err(ValueObjectError::InvalidName(chars));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ParticipantName> for String {
    fn from(value: ParticipantName) -> Self {
        value.0
    }
}

/// 議題（作成時に設定され、以後変更されない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        let chars = trimmed.chars().count();
        if chars == 0 || chars > MAX_TOPIC_CHARS {
            return Err(ValueObjectError::InvalidTopic(chars));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(value: Topic) -> Self {
        value.0
    }
}

/// 委任レベルのカード（1〜7）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 7;

    pub fn new(value: u8) -> Result<Self, ValueObjectError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValueObjectError::InvalidCard(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// 1 から 7 までの全カードを昇順で返す
    pub fn all() -> impl Iterator<Item = Card> {
        (Self::MIN..=Self::MAX).map(Card)
    }

    /// 0 始まりのインデックス
    pub fn index(&self) -> usize {
        usize::from(self.0 - Self::MIN)
    }
}

impl TryFrom<u8> for Card {
    type Error = ValueObjectError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Card> for u8 {
    fn from(value: Card) -> Self {
        value.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ストアが付与するタイムスタンプ（Unix ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `earlier` からの経過ミリ秒（負にはならない）
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_is_uppercased_before_validation() {
        // テスト項目: 小文字で入力された Room ID が大文字化されて受理される
        // given (前提条件):
        let input = " ab12cd ".to_string();

        // when (操作):
        let result = RoomId::new(input);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "AB12CD");
    }

    #[test]
    fn test_room_id_rejects_wrong_length_and_symbols() {
        // テスト項目: 長さ違い・記号を含む Room ID はエラーになる
        // given (前提条件):
        let inputs = ["ABC12", "ABC1234", "AB-12C", ""];

        for input in inputs {
            // when (操作):
            let result = RoomId::new(input.to_string());

            // then (期待する結果):
            assert!(matches!(result, Err(ValueObjectError::InvalidRoomId(_))));
        }
    }

    #[test]
    fn test_participant_name_limits() {
        // テスト項目: 参加者名は前後の空白を除いて 1〜20 文字
        // given (前提条件):
        let ok = "  alice  ".to_string();
        let twenty = "あ".repeat(20);
        let too_long = "a".repeat(21);
        let blank = "   ".to_string();

        // when (操作) / then (期待する結果):
        assert_eq!(ParticipantName::new(ok).unwrap().as_str(), "alice");
        assert!(ParticipantName::new(twenty).is_ok());
        assert_eq!(
            ParticipantName::new(too_long),
            Err(ValueObjectError::InvalidName(21))
        );
        assert_eq!(
            ParticipantName::new(blank),
            Err(ValueObjectError::InvalidName(0))
        );
    }

    #[test]
    fn test_card_range() {
        // テスト項目: カードは 1〜7 のみ受理される
        // given (前提条件):

        // when (操作) / then (期待する結果):
        assert!(Card::new(0).is_err());
        assert!(Card::new(8).is_err());
        assert_eq!(Card::new(7).unwrap().value(), 7);
        assert_eq!(Card::all().count(), 7);
        assert_eq!(Card::new(1).unwrap().index(), 0);
    }

    #[test]
    fn test_card_deserialize_rejects_out_of_range() {
        // テスト項目: JSON からの復元時も範囲外のカードは拒否される
        // given (前提条件):
        let json = "9";

        // when (操作):
        let result = serde_json::from_str::<Card>(json);

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(serde_json::from_str::<Card>("5").unwrap().value(), 5);
    }

    #[test]
    fn test_timestamp_millis_since_never_negative() {
        // テスト項目: 経過時間は時計の巻き戻りがあっても負にならない
        // given (前提条件):
        let earlier = Timestamp::new(2_000);
        let later = Timestamp::new(1_000);

        // when (操作):
        let elapsed = later.millis_since(earlier);

        // then (期待する結果):
        assert_eq!(elapsed, 0);
        assert_eq!(earlier.millis_since(later), 1_000);
    }
}
