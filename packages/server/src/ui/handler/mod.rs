mod http;
mod websocket;

pub use http::{
    ApiError, add_vote_result, commit_batch, create_room, get_participant, get_room, health_check,
    list_participants, list_rooms, list_vote_results, set_participant, update_participant,
    update_room,
};
pub use websocket::{participants_websocket_handler, room_websocket_handler};
