//! Yoriai document store server.
//!
//! Hosts rooms, participants and vote results in memory and pushes snapshots
//! to subscribers over WebSocket.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yoriai-server
//! cargo run --bin yoriai-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use yoriai_server::{infrastructure::store::InMemoryRoomStore, ui::Server};
use yoriai_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "yoriai-server")]
#[command(about = "Realtime delegation poker document store server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // 1. Create Store (in-memory database)
    let store = Arc::new(InMemoryRoomStore::new(Arc::new(SystemClock)));

    // 2. Create and run the server
    let server = Server::new(store);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
