//! Domain layer.
//!
//! Pure voting rules (state machine, tally, presence, vote visibility), the
//! value objects and entities they operate on, and the `RoomStore` trait the
//! rest of the system writes through.

pub mod ballot;
pub mod entity;
pub mod error;
pub mod factory;
pub mod presence;
pub mod state_machine;
pub mod store;
pub mod tally;
pub mod value_object;

pub use ballot::{VoteVisibility, visible_vote};
pub use entity::{Participant, RankedCard, Room, RoomStatus, VoteResult};
pub use error::{StoreError, TransitionError, ValueObjectError};
pub use factory::{ParticipantIdFactory, RoomIdFactory};
pub use presence::PresencePolicy;
pub use state_machine::HostCommand;
pub use store::{
    NewParticipant, NewRoom, NewVoteResult, ParticipantPatch, RoomPatch, RoomStore, Subscription,
    WriteBatch, WriteOp,
};
pub use tally::Tally;
pub use value_object::{Card, ParticipantId, ParticipantName, RoomId, Timestamp, Topic};
