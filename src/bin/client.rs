//! Room chat CLI client.
//!
//! Connects to a relay server over WebSocket, creates or joins a
//! password-protected room, and exchanges chat messages from stdin.
//! On failure, offers a single explicit retry that rejoins the last room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin client -- --name Alice --room-name lobby --password 123456
//! cargo run --bin client -- -n Bob -r R1 -p 123456
//! ```

use clap::Parser;

use room_chat_rs::client::{RunOptions, run_client};
use room_chat_rs::common::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "CLI client for a password-protected chat room relay", long_about = None)]
struct Args {
    /// Display name shown to other room members
    #[arg(short = 'n', long)]
    name: String,

    /// Relay WebSocket URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080")]
    url: String,

    /// Room ID to join; omit to create a new room
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// Room password; omit to generate one via the bootstrap endpoint when creating
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// Room name sent to the bootstrap endpoint when generating a password
    #[arg(long)]
    room_name: Option<String>,

    /// Bootstrap endpoint URL for password generation
    #[arg(long)]
    bootstrap_url: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = run_client(RunOptions {
        url: args.url,
        display_name: args.name,
        room_id: args.room,
        room_name: args.room_name,
        password: args.password,
        bootstrap_url: args.bootstrap_url,
    })
    .await
    {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
