//! View formatting utilities for client display.

use yoriai_server::domain::{Card, Room, RoomStatus, VoteResult, VoteVisibility};
use yoriai_shared::time::{timestamp_to_jst_clock, timestamp_to_jst_rfc3339};

use crate::session::RoomView;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// View formatter for client display
pub struct ViewFormatter;

impl ViewFormatter {
    fn medal(rank: usize) -> &'static str {
        match rank {
            1 => "🥇",
            2 => "🥈",
            3 => "🥉",
            _ => "  ",
        }
    }

    fn vote_cell(vote: VoteVisibility) -> String {
        match vote {
            VoteVisibility::NotVoted => "-".to_string(),
            VoteVisibility::Hidden => "✓".to_string(),
            VoteVisibility::Revealed(card) => card.to_string(),
        }
    }

    /// Format the whole room view
    ///
    /// The tally is shown only once votes are revealed.
    pub fn format_room(view: &RoomView) -> String {
        let room = &view.room;
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!(
            "Room {} [{}]{}\n",
            room.id,
            room.status,
            if view.is_host { " (you are the host)" } else { "" }
        ));
        output.push_str(&format!("Topic: {}\n", room.topic.as_str()));
        output.push_str(&format!(
            "Online {} / {}   Voted {}\n",
            view.online_count,
            view.participants.len(),
            view.voted_count
        ));
        output.push_str(&format!("{}\n", THIN_RULE));

        if view.participants.is_empty() {
            output.push_str("(No participants)\n");
        }
        for participant in &view.participants {
            let presence = if participant.online { "●" } else { "○" };
            let me_suffix = if participant.is_me { " (me)" } else { "" };
            let host_suffix = if participant.is_host { " [host]" } else { "" };
            output.push_str(&format!(
                "{} {}{}{}  {}\n",
                presence,
                participant.name,
                me_suffix,
                host_suffix,
                Self::vote_cell(participant.vote)
            ));
        }

        if room.status != RoomStatus::Voting {
            output.push_str(&format!("{}\n", THIN_RULE));
            output.push_str(&Self::format_tally(view));
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Card counts with medal decoration for the top three ranks
    pub fn format_tally(view: &RoomView) -> String {
        let tally = &view.tally;
        if tally.total_votes() == 0 {
            return "(No votes)\n".to_string();
        }

        let mut output = String::new();
        for card in Card::all() {
            let count = tally.count(card);
            if count == 0 {
                continue;
            }
            let medal = if tally.is_medal_worthy(card) {
                Self::medal(tally.rank(card))
            } else {
                "  "
            };
            output.push_str(&format!(
                "{} card {}: {} vote{} (rank {})\n",
                medal,
                card,
                count,
                if count == 1 { "" } else { "s" },
                tally.rank(card)
            ));
        }
        output
    }

    /// Format the open room picker
    pub fn format_room_list(rooms: &[Room]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", RULE));
        output.push_str("Open rooms:\n");
        if rooms.is_empty() {
            output.push_str("(No open rooms)\n");
        }
        for room in rooms {
            output.push_str(&format!(
                "{}  [{}]  {}  - created at {}\n",
                room.id,
                room.status,
                room.topic.as_str(),
                timestamp_to_jst_clock(room.created_at.value())
            ));
        }
        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format past vote results
    pub fn format_history(results: &[VoteResult]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", RULE));
        output.push_str("Past results:\n");
        if results.is_empty() {
            output.push_str("(No results yet)\n");
        }
        for result in results {
            let voted_at = timestamp_to_jst_rfc3339(result.voted_at.value())
                .unwrap_or_else(|| "unknown time".to_string());
            output.push_str(&format!(
                "{}  {}  ({})\n",
                result.room_id,
                result.topic.as_str(),
                voted_at
            ));
            if result.results.is_empty() {
                output.push_str("    (No votes)\n");
            }
            for ranked in &result.results {
                output.push_str(&format!(
                    "    {} card {}: {} (rank {})\n",
                    Self::medal(ranked.rank),
                    ranked.card,
                    ranked.count,
                    ranked.rank
                ));
            }
        }
        output.push_str(&format!("{}\n", RULE));
        output
    }

    pub fn format_room_created(room: &Room) -> String {
        format!(
            "\nRoom {} created. Share this code so others can /join it.\n",
            room.id
        )
    }

    pub fn format_room_ended() -> String {
        "\nThe host ended this room. Returning to the lobby.\n".to_string()
    }

    pub fn format_room_not_found(room_id: &str) -> String {
        format!("\nRoom {} was not found. Returning to the lobby.\n", room_id)
    }

    pub fn format_disconnected() -> String {
        "\nLost connection to the server. Returning to the lobby.\n".to_string()
    }

    pub fn format_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    pub fn lobby_help() -> &'static str {
        "\nCommands:\n  /create <topic>  create a room and join as host\n  /join <ROOM>     join a room by code\n  /rooms           list open rooms\n  /history         show past results\n  /quit            exit\n"
    }

    pub fn room_help() -> &'static str {
        "\nCommands:\n  /vote <1-7>  select a card (same card again clears it)\n  /reveal      reveal all votes (host)\n  /reset       clear all votes for another round (host)\n  /end         end the room and record the result (host)\n  /away        mark yourself away\n  /back        mark yourself back\n  /show        redraw the room\n  /leave       return to the lobby\n"
    }
}
