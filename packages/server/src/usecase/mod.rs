//! UseCase layer.
//!
//! Command and query operations over a `RoomStore`. Each use case re-reads
//! the documents it depends on before writing, so callers holding a stale
//! view cannot push an illegal write.

mod create_room;
mod error;
mod get_rooms;
mod get_vote_results;
mod host_command;
mod join_room;
mod presence;
mod select_card;

pub use create_room::{CREATE_ROOM_TIMEOUT, CreateRoomUseCase};
pub use error::{
    CreateRoomError, HostCommandError, JoinRoomError, ListError, PresenceError, SelectCardError,
};
pub use get_rooms::{DEFAULT_ROOM_LIST_LIMIT, GetOpenRoomsUseCase};
pub use get_vote_results::{DEFAULT_HISTORY_LIMIT, GetVoteResultsUseCase};
pub use host_command::HostCommandUseCase;
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use presence::PresenceUseCase;
pub use select_card::{SelectCardUseCase, toggle};
