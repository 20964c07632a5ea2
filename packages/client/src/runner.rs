//! Interactive client loop.
//!
//! A blocking rustyline thread feeds input lines into a channel; the async
//! side alternates between the lobby and a room session.

use std::{path::PathBuf, sync::Arc};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use yoriai_server::usecase::{DEFAULT_HISTORY_LIMIT, DEFAULT_ROOM_LIST_LIMIT};
use yoriai_shared::time::SystemClock;

use crate::{
    command::{LobbyCommand, RoomCommand},
    error::SessionError,
    formatter::ViewFormatter,
    identity::{FileLocalStore, IdentityProvider},
    remote::HttpRoomStore,
    session::{Lobby, RoomSession, SessionConfig, SessionEvent},
    ui::redisplay_prompt,
};

/// Spawns the readline thread. The receiver closes on Ctrl+C or Ctrl+D.
fn spawn_input(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", prompt);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// How a room view was left
enum RoomExit {
    /// Back to the lobby
    Lobby,
    /// Input closed, exit the client
    Quit,
}

/// Run the interactive client
pub async fn run_client(
    server_url: String,
    name: String,
    data_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(HttpRoomStore::new(&server_url)?);
    let identity = IdentityProvider::new(Arc::new(FileLocalStore::open(&data_dir)?));
    let participant_id = identity.participant_id()?;
    let lobby = Lobby::new(
        store,
        identity,
        Arc::new(SystemClock),
        SessionConfig::default(),
    );

    tracing::info!("Using server {} as '{}'", server_url, participant_id);
    println!(
        "\nWelcome, {}. Type /help for commands. Press Ctrl+C to exit.",
        name
    );

    let mut input_rx = spawn_input(name.clone());

    while let Some(line) = input_rx.recv().await {
        let command = match LobbyCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                print!("{}", ViewFormatter::format_error(&e.0));
                continue;
            }
        };

        let joined = match command {
            LobbyCommand::Create(topic) => match lobby.create_room(&name, &topic).await {
                Ok(room) => {
                    print!("{}", ViewFormatter::format_room_created(&room));
                    Some(room.id.into_string())
                }
                Err(e) => {
                    print!("{}", ViewFormatter::format_error(&e.to_string()));
                    None
                }
            },
            LobbyCommand::Join(room_id) => Some(room_id),
            LobbyCommand::Rooms => {
                match lobby.open_rooms(DEFAULT_ROOM_LIST_LIMIT).await {
                    Ok(rooms) => print!("{}", ViewFormatter::format_room_list(&rooms)),
                    Err(e) => print!("{}", ViewFormatter::format_error(&e.to_string())),
                }
                None
            }
            LobbyCommand::History => {
                match lobby.history(DEFAULT_HISTORY_LIMIT).await {
                    Ok(results) => print!("{}", ViewFormatter::format_history(&results)),
                    Err(e) => print!("{}", ViewFormatter::format_error(&e.to_string())),
                }
                None
            }
            LobbyCommand::Help => {
                print!("{}", ViewFormatter::lobby_help());
                None
            }
            LobbyCommand::Quit => break,
        };

        let Some(room_id) = joined else {
            continue;
        };

        match lobby.enter(&room_id, &name).await {
            Ok((session, events)) => {
                if let RoomExit::Quit = run_room(session, events, &mut input_rx, &name).await {
                    break;
                }
            }
            Err(SessionError::RoomNotFound(room_id)) => {
                print!("{}", ViewFormatter::format_room_not_found(&room_id));
            }
            Err(e) => print!("{}", ViewFormatter::format_error(&e.to_string())),
        }
    }

    tracing::info!("Client session ended normally");
    Ok(())
}

async fn run_room(
    mut session: RoomSession,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    prompt: &str,
) -> RoomExit {
    let mut pending_reset = false;
    if let Some(view) = session.view() {
        print!("{}", ViewFormatter::format_room(&view));
    }
    print!("{}", ViewFormatter::room_help());
    redisplay_prompt(prompt);

    let exit = loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(SessionEvent::RoomEnded) => print!("{}", ViewFormatter::format_room_ended()),
                    Some(SessionEvent::RoomNotFound) => {
                        print!("{}", ViewFormatter::format_room_not_found(session.room_id().as_str()));
                    }
                    Some(SessionEvent::Disconnected) | None => {
                        print!("{}", ViewFormatter::format_disconnected());
                    }
                }
                redisplay_prompt(prompt);
                break RoomExit::Lobby;
            }
            changed = session.changed() => {
                if changed && let Some(view) = session.view() {
                    print!("{}", ViewFormatter::format_room(&view));
                    redisplay_prompt(prompt);
                }
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    break RoomExit::Quit;
                };

                if pending_reset {
                    pending_reset = false;
                    if line.eq_ignore_ascii_case("y") {
                        report(session.reset_round().await.map(|_| ()));
                    } else {
                        println!("Reset cancelled.");
                    }
                    redisplay_prompt(prompt);
                    continue;
                }

                match RoomCommand::parse(&line) {
                    Ok(RoomCommand::Vote(card)) => match session.select_card(card).await {
                        Ok(Some(card)) => println!("You selected card {}.", card),
                        Ok(None) => println!("Your vote was cleared."),
                        Err(e) => print!("{}", ViewFormatter::format_error(&e.to_string())),
                    },
                    Ok(RoomCommand::Reveal) => report(session.reveal().await.map(|_| ())),
                    Ok(RoomCommand::Reset) => {
                        if session.is_host() {
                            pending_reset = true;
                            println!("This clears every vote. Reset the round? [y/N]");
                        } else {
                            report(Err(SessionError::NotHost("reset the round")));
                        }
                    }
                    Ok(RoomCommand::End) => report(session.end_room().await.map(|_| ())),
                    Ok(RoomCommand::Away) => report(session.set_visible(false).await),
                    Ok(RoomCommand::Back) => report(session.set_visible(true).await),
                    Ok(RoomCommand::Show) => {
                        if let Some(view) = session.view() {
                            print!("{}", ViewFormatter::format_room(&view));
                        }
                    }
                    Ok(RoomCommand::Help) => print!("{}", ViewFormatter::room_help()),
                    Ok(RoomCommand::Leave) => break RoomExit::Lobby,
                    Err(e) => print!("{}", ViewFormatter::format_error(&e.0)),
                }
                redisplay_prompt(prompt);
            }
        }
    };

    session.close().await;
    exit
}

fn report(result: Result<(), SessionError>) {
    if let Err(e) = result {
        print!("{}", ViewFormatter::format_error(&e.to_string()));
    }
}
