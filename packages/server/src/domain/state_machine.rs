//! Room State Machine.
//!
//! ```text
//! voting ──reveal──▶ revealed ──end_room──▶ ended
//!    ▲                  │
//!    └───reset_round────┘
//! ```
//!
//! Every transition is host-only. The caller presents the host id it
//! remembers locally for the room, and the check is repeated here before any
//! write is planned so a desynchronized UI can never issue a host write.

use std::fmt;

use super::{
    entity::{Room, RoomStatus},
    error::TransitionError,
    value_object::ParticipantId,
};

/// Host-only room commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCommand {
    Reveal,
    ResetRound,
    EndRoom,
}

impl HostCommand {
    pub fn action(&self) -> &'static str {
        match self {
            HostCommand::Reveal => "reveal votes",
            HostCommand::ResetRound => "reset the round",
            HostCommand::EndRoom => "end the room",
        }
    }

    /// The only status the command is legal from.
    pub fn required_status(&self) -> RoomStatus {
        match self {
            HostCommand::Reveal => RoomStatus::Voting,
            HostCommand::ResetRound => RoomStatus::Revealed,
            HostCommand::EndRoom => RoomStatus::Revealed,
        }
    }

    pub fn target_status(&self) -> RoomStatus {
        match self {
            HostCommand::Reveal => RoomStatus::Revealed,
            HostCommand::ResetRound => RoomStatus::Voting,
            HostCommand::EndRoom => RoomStatus::Ended,
        }
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

/// Whether the locally remembered host id grants host capability for `room`.
pub fn is_host(room: &Room, remembered_host_id: Option<&ParticipantId>) -> bool {
    remembered_host_id.is_some_and(|id| room.is_hosted_by(id))
}

/// Validate `command` against the room and return the status it leads to.
///
/// Authorization is checked first, so a non-host never learns anything from
/// the state check.
pub fn plan_transition(
    room: &Room,
    remembered_host_id: Option<&ParticipantId>,
    command: HostCommand,
) -> Result<RoomStatus, TransitionError> {
    if !is_host(room, remembered_host_id) {
        return Err(TransitionError::NotHost(command.action()));
    }

    if room.status != command.required_status() {
        return Err(TransitionError::InvalidState {
            action: command.action(),
            status: room.status,
        });
    }

    Ok(command.target_status())
}

/// Card selection is only accepted while voting.
pub fn can_select_card(room: &Room) -> bool {
    room.status == RoomStatus::Voting
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{RoomId, Timestamp, Topic};

    fn room_with_status(status: RoomStatus) -> Room {
        Room {
            id: RoomId::new("ABC123".to_string()).unwrap(),
            status,
            host_id: host(),
            topic: Topic::new("Pick a database".to_string()).unwrap(),
            created_at: Timestamp::new(1_000),
            ended_at: None,
        }
    }

    fn host() -> ParticipantId {
        ParticipantId::new("host-1".to_string()).unwrap()
    }

    fn guest() -> ParticipantId {
        ParticipantId::new("guest-1".to_string()).unwrap()
    }

    const ALL_STATUSES: [RoomStatus; 3] =
        [RoomStatus::Voting, RoomStatus::Revealed, RoomStatus::Ended];

    #[test]
    fn test_reveal_only_from_voting() {
        // テスト項目: reveal は voting からのみ許可される
        // given (前提条件):
        let host = host();

        for status in ALL_STATUSES {
            let room = room_with_status(status);

            // when (操作):
            let result = plan_transition(&room, Some(&host), HostCommand::Reveal);

            // then (期待する結果):
            if status == RoomStatus::Voting {
                assert_eq!(result, Ok(RoomStatus::Revealed));
            } else {
                assert_eq!(
                    result,
                    Err(TransitionError::InvalidState {
                        action: HostCommand::Reveal.action(),
                        status,
                    })
                );
            }
        }
    }

    #[test]
    fn test_reset_and_end_only_from_revealed() {
        // テスト項目: reset_round と end_room は revealed からのみ許可される
        // given (前提条件):
        let host = host();

        for status in ALL_STATUSES {
            let room = room_with_status(status);

            // when (操作):
            let reset = plan_transition(&room, Some(&host), HostCommand::ResetRound);
            let end = plan_transition(&room, Some(&host), HostCommand::EndRoom);

            // then (期待する結果):
            if status == RoomStatus::Revealed {
                assert_eq!(reset, Ok(RoomStatus::Voting));
                assert_eq!(end, Ok(RoomStatus::Ended));
            } else {
                assert!(matches!(reset, Err(TransitionError::InvalidState { .. })));
                assert!(matches!(end, Err(TransitionError::InvalidState { .. })));
            }
        }
    }

    #[test]
    fn test_ended_accepts_no_transition() {
        // テスト項目: ended は終端状態でどのコマンドも受け付けない
        // given (前提条件):
        let room = room_with_status(RoomStatus::Ended);
        let host = host();

        // when (操作) / then (期待する結果):
        for command in [
            HostCommand::Reveal,
            HostCommand::ResetRound,
            HostCommand::EndRoom,
        ] {
            assert!(plan_transition(&room, Some(&host), command).is_err());
        }
        assert!(!can_select_card(&room));
    }

    #[test]
    fn test_non_host_is_rejected_before_state_check() {
        // テスト項目: ホスト以外（記憶された host id なし・不一致）は状態に関わらず拒否される
        // given (前提条件):
        let room = room_with_status(RoomStatus::Voting);
        let guest = guest();

        // when (操作):
        let forged = plan_transition(&room, Some(&guest), HostCommand::Reveal);
        let missing = plan_transition(&room, None, HostCommand::Reveal);

        // then (期待する結果):
        assert_eq!(forged, Err(TransitionError::NotHost("reveal votes")));
        assert_eq!(missing, Err(TransitionError::NotHost("reveal votes")));
    }

    #[test]
    fn test_can_select_card_only_while_voting() {
        // テスト項目: カード選択は voting 中のみ可能
        // given (前提条件):

        // when (操作) / then (期待する結果):
        assert!(can_select_card(&room_with_status(RoomStatus::Voting)));
        assert!(!can_select_card(&room_with_status(RoomStatus::Revealed)));
    }
}
