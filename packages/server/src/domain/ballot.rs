//! Vote visibility.
//!
//! A participant's card is visible to others only once the room has been
//! revealed. The voter always sees their own card.

use serde::{Deserialize, Serialize};

use super::{
    entity::{Participant, RoomStatus},
    value_object::{Card, ParticipantId},
};

/// How one participant's vote appears to a given viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "card", rename_all = "lowercase")]
pub enum VoteVisibility {
    NotVoted,
    /// Voted, value concealed.
    Hidden,
    Revealed(Card),
}

pub fn visible_vote(
    participant: &Participant,
    viewer: &ParticipantId,
    status: RoomStatus,
) -> VoteVisibility {
    match participant.selected_card {
        None => VoteVisibility::NotVoted,
        Some(card) if &participant.id == viewer || status != RoomStatus::Voting => {
            VoteVisibility::Revealed(card)
        }
        Some(_) => VoteVisibility::Hidden,
    }
}
