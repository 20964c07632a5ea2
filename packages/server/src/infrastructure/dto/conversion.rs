//! Conversion logic between DTOs and domain entities.
//!
//! Domain → DTO is infallible. DTO → domain re-validates every value object,
//! since the DTO may come from the network.

use crate::domain::{
    Card, Participant, ParticipantId, ParticipantName, RankedCard, Room, RoomId, StoreError,
    Timestamp, Topic, ValueObjectError, VoteResult,
};

use super::{
    http::{ErrorKind, ErrorResponse, ParticipantDto, RankedCardDto, RoomDto, VoteResultDto},
    websocket::{MessageType, ParticipantsSnapshotMessage, RoomSnapshotMessage},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Room> for RoomDto {
    fn from(model: Room) -> Self {
        Self {
            room_id: model.id.into_string(),
            status: model.status,
            host_id: model.host_id.into_string(),
            topic: model.topic.into_string(),
            created_at: model.created_at.value(),
            ended_at: model.ended_at.map(|t| t.value()),
        }
    }
}

impl From<Participant> for ParticipantDto {
    fn from(model: Participant) -> Self {
        Self {
            participant_id: model.id.into_string(),
            name: model.name.into_string(),
            selected_card: model.selected_card.map(u8::from),
            online: model.online,
            last_seen_at: model.last_seen_at.value(),
        }
    }
}

impl From<RankedCard> for RankedCardDto {
    fn from(model: RankedCard) -> Self {
        Self {
            card: model.card.value(),
            count: model.count,
            rank: model.rank,
        }
    }
}

impl From<VoteResult> for VoteResultDto {
    fn from(model: VoteResult) -> Self {
        Self {
            result_id: model.id,
            room_id: model.room_id.into_string(),
            topic: model.topic.into_string(),
            results: model.results.into_iter().map(RankedCardDto::from).collect(),
            voted_at: model.voted_at.value(),
        }
    }
}

impl From<&StoreError> for ErrorResponse {
    fn from(error: &StoreError) -> Self {
        let (kind, detail) = match error {
            StoreError::NotFound(detail) => (ErrorKind::NotFound, detail),
            StoreError::AlreadyExists(detail) => (ErrorKind::AlreadyExists, detail),
            StoreError::Conflict(detail) => (ErrorKind::Conflict, detail),
            StoreError::Invalid(detail) => (ErrorKind::Invalid, detail),
            StoreError::Unavailable(detail) => (ErrorKind::Unavailable, detail),
        };
        Self {
            kind,
            message: detail.clone(),
        }
    }
}

impl RoomSnapshotMessage {
    pub fn new(room: Option<Room>) -> Self {
        Self {
            r#type: MessageType::RoomSnapshot,
            room: room.map(RoomDto::from),
        }
    }
}

impl ParticipantsSnapshotMessage {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            r#type: MessageType::ParticipantsSnapshot,
            participants: participants.into_iter().map(ParticipantDto::from).collect(),
        }
    }
}

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<RoomDto> for Room {
    type Error = ValueObjectError;

    fn try_from(dto: RoomDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RoomId::new(dto.room_id)?,
            status: dto.status,
            host_id: ParticipantId::new(dto.host_id)?,
            topic: Topic::new(dto.topic)?,
            created_at: Timestamp::new(dto.created_at),
            ended_at: dto.ended_at.map(Timestamp::new),
        })
    }
}

impl TryFrom<ParticipantDto> for Participant {
    type Error = ValueObjectError;

    fn try_from(dto: ParticipantDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ParticipantId::new(dto.participant_id)?,
            name: ParticipantName::new(dto.name)?,
            selected_card: dto.selected_card.map(Card::new).transpose()?,
            online: dto.online,
            last_seen_at: Timestamp::new(dto.last_seen_at),
        })
    }
}

impl TryFrom<RankedCardDto> for RankedCard {
    type Error = ValueObjectError;

    fn try_from(dto: RankedCardDto) -> Result<Self, Self::Error> {
        Ok(Self {
            card: Card::new(dto.card)?,
            count: dto.count,
            rank: dto.rank,
        })
    }
}

impl TryFrom<VoteResultDto> for VoteResult {
    type Error = ValueObjectError;

    fn try_from(dto: VoteResultDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: dto.result_id,
            room_id: RoomId::new(dto.room_id)?,
            topic: Topic::new(dto.topic)?,
            results: dto
                .results
                .into_iter()
                .map(RankedCard::try_from)
                .collect::<Result<_, _>>()?,
            voted_at: Timestamp::new(dto.voted_at),
        })
    }
}

impl From<ErrorResponse> for StoreError {
    fn from(response: ErrorResponse) -> Self {
        match response.kind {
            ErrorKind::NotFound => StoreError::NotFound(response.message),
            ErrorKind::AlreadyExists => StoreError::AlreadyExists(response.message),
            ErrorKind::Conflict => StoreError::Conflict(response.message),
            ErrorKind::Invalid => StoreError::Invalid(response.message),
            ErrorKind::Unavailable => StoreError::Unavailable(response.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomStatus;

    #[test]
    fn test_dto_participant_with_invalid_card_is_rejected() {
        // テスト項目: 範囲外のカードを持つ参加者 DTO はドメインに変換できない
        // given (前提条件):
        let dto = ParticipantDto {
            participant_id: "alice".to_string(),
            name: "Alice".to_string(),
            selected_card: Some(9),
            online: true,
            last_seen_at: 1000,
        };

        // when (操作):
        let result = Participant::try_from(dto);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::InvalidCard(9)));
    }

    #[test]
    fn test_domain_room_to_dto() {
        // テスト項目: ドメインエンティティの Room が DTO に変換される
        // given (前提条件):
        let room = Room {
            id: RoomId::new("XYZ789".to_string()).unwrap(),
            status: RoomStatus::Ended,
            host_id: ParticipantId::new("host".to_string()).unwrap(),
            topic: Topic::new("Budget".to_string()).unwrap(),
            created_at: Timestamp::new(1_000),
            ended_at: Some(Timestamp::new(2_000)),
        };

        // when (操作):
        let dto = RoomDto::from(room);

        // then (期待する結果):
        assert_eq!(dto.room_id, "XYZ789");
        assert_eq!(dto.status, RoomStatus::Ended);
        assert_eq!(dto.ended_at, Some(2_000));
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["status"], "ended");
    }

    #[test]
    fn test_store_error_survives_error_response() {
        // テスト項目: StoreError の種類がエラーレスポンス経由で保持される
        // given (前提条件):
        let error = StoreError::NotFound("rooms/ABCDEF".to_string());

        // when (操作):
        let response = ErrorResponse::from(&error);
        let restored = StoreError::from(response.clone());

        // then (期待する結果):
        assert_eq!(response.kind, ErrorKind::NotFound);
        assert_eq!(restored, error);
    }

    #[test]
    fn test_snapshot_message_type_is_kebab_case() {
        // テスト項目: スナップショットメッセージの type が kebab-case で出力される
        // given (前提条件):
        let message = RoomSnapshotMessage::new(None);

        // when (操作):
        let json = serde_json::to_value(&message).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "room-snapshot");
        assert!(json["room"].is_null());
    }
}
