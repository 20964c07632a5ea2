//! Input line parsing for the interactive client.

use yoriai_server::domain::Card;

/// 入口画面のコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyCommand {
    Create(String),
    Join(String),
    Rooms,
    History,
    Help,
    Quit,
}

/// Room 画面のコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomCommand {
    Vote(Card),
    Reveal,
    Reset,
    End,
    Away,
    Back,
    Show,
    Help,
    Leave,
}

/// Parse failure, rendered to the user as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

fn split(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

impl LobbyCommand {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        match split(line) {
            ("/create", "") => Err(ParseError("Usage: /create <topic>".to_string())),
            ("/create", topic) => Ok(Self::Create(topic.to_string())),
            ("/join", "") => Err(ParseError("Usage: /join <ROOM>".to_string())),
            ("/join", room_id) => Ok(Self::Join(room_id.to_string())),
            ("/rooms", _) => Ok(Self::Rooms),
            ("/history", _) => Ok(Self::History),
            ("/help", _) => Ok(Self::Help),
            ("/quit", _) | ("/exit", _) => Ok(Self::Quit),
            (other, _) => Err(ParseError(format!(
                "Unknown command '{}'. Type /help for commands.",
                other
            ))),
        }
    }
}

impl RoomCommand {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        match split(line) {
            ("/vote", raw) => raw
                .parse::<u8>()
                .ok()
                .and_then(|value| Card::new(value).ok())
                .map(Self::Vote)
                .ok_or_else(|| {
                    ParseError(format!(
                        "Usage: /vote <{}-{}>",
                        Card::MIN,
                        Card::MAX
                    ))
                }),
            ("/reveal", _) => Ok(Self::Reveal),
            ("/reset", _) => Ok(Self::Reset),
            ("/end", _) => Ok(Self::End),
            ("/away", _) => Ok(Self::Away),
            ("/back", _) => Ok(Self::Back),
            ("/show", _) => Ok(Self::Show),
            ("/help", _) => Ok(Self::Help),
            ("/leave", _) => Ok(Self::Leave),
            (other, _) => Err(ParseError(format!(
                "Unknown command '{}'. Type /help for commands.",
                other
            ))),
        }
    }
}
