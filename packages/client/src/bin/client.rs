//! Interactive Yoriai voting client.
//!
//! Create or join a room, pick a delegation level card (1-7), and follow the
//! host through reveal, reset and end. Presence is kept alive with heartbeats
//! while you are in a room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yoriai-client -- --name Alice
//! cargo run --bin yoriai-client -- -n Bob -s http://127.0.0.1:3000 -d .yoriai-bob
//! ```

use std::path::PathBuf;

use clap::Parser;

use yoriai_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "yoriai-client")]
#[command(about = "Realtime delegation poker client", long_about = None)]
struct Args {
    /// Display name shown to other participants (1-20 characters)
    #[arg(short = 'n', long)]
    name: String,

    /// Yoriai server URL
    #[arg(short = 's', long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Directory holding the local identity file
    #[arg(short = 'd', long, default_value = ".yoriai")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = yoriai_client::run_client(args.server, args.name, args.data_dir).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
