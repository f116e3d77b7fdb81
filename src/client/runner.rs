//! Client execution logic with user-driven retry.
//!
//! Runs session attempts one at a time. There is no automatic reconnect:
//! after a failed attempt the user is asked once, and a confirmed retry
//! re-joins the last known room. If no room was ever assigned there is
//! nothing to rejoin and the create/join flow must be restarted.
//!
//! One input thread serves the whole run: chat lines during an attempt and
//! the retry confirmation between attempts arrive over the same channel, so
//! no abandoned stdin reader can swallow a line.

use std::io::Write;

use tokio::sync::mpsc;

use crate::client::bootstrap::generate_room_credentials;
use crate::client::error::ClientError;
use crate::client::machine::{RoomAction, RoomIntent, Session};
use crate::client::session::{SessionEnd, run_room_session};
use crate::client::ui::spawn_input_thread;

/// Options gathered from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Relay WebSocket URL.
    pub url: String,
    /// Display name shown to other room members.
    pub display_name: String,
    /// Room to join; `None` means create a new room.
    pub room_id: Option<String>,
    /// Room name sent to the bootstrap endpoint when generating a password.
    pub room_name: Option<String>,
    /// Room password; when creating, `None` falls back to the bootstrap
    /// endpoint.
    pub password: Option<String>,
    /// Bootstrap endpoint URL for password generation.
    pub bootstrap_url: Option<String>,
}

/// Run the chat client until the user exits or recovery is impossible.
pub async fn run_client(options: RunOptions) -> Result<(), ClientError> {
    let action = match &options.room_id {
        Some(room_id) => RoomAction::Join {
            room_id: room_id.clone(),
        },
        None => RoomAction::Create,
    };

    let password = resolve_password(&options, &action).await?;

    // Validation happens here, before any connection is opened.
    let mut session = Session::connect(RoomIntent {
        display_name: options.display_name.clone(),
        action,
        password,
    })?;

    let mut input_rx = spawn_input_thread(&options.display_name);

    loop {
        tracing::info!(
            "Connecting to {} as '{}'",
            options.url,
            options.display_name
        );

        let (finished, end) = run_room_session(&options.url, session, &mut input_rx).await?;

        match end {
            SessionEnd::UserExit => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            SessionEnd::ConnectionLost | SessionEnd::RelayError => {
                if !confirm_retry(&mut input_rx).await {
                    return Ok(());
                }

                match finished.retry() {
                    Ok(next) => {
                        tracing::info!(
                            "Retrying: rejoining room '{}'",
                            next.last_known_room().unwrap_or_default()
                        );
                        session = next;
                    }
                    Err(e) => {
                        // No room was ever assigned; the user has to start
                        // the create/join flow over.
                        return Err(e);
                    }
                }
            }
        }
    }
}

/// Resolve the room password from the options, asking the bootstrap
/// endpoint for a generated one when creating without an explicit password.
async fn resolve_password(
    options: &RunOptions,
    action: &RoomAction,
) -> Result<String, ClientError> {
    if let Some(password) = &options.password {
        return Ok(password.clone());
    }

    if let (RoomAction::Create, Some(endpoint), Some(room_name)) =
        (action, &options.bootstrap_url, &options.room_name)
    {
        let credentials = generate_room_credentials(endpoint, room_name).await?;
        tracing::info!("Generated password for room '{}'", credentials.room_name);
        println!("Generated room password: {}", credentials.password);
        return Ok(credentials.password);
    }

    Err(ClientError::MissingPassword)
}

/// Ask the user whether to retry the connection. One question, one attempt.
///
/// Reads the answer from the shared input channel; a closed channel means
/// the user ended input, which counts as "no".
async fn confirm_retry(input_rx: &mut mpsc::UnboundedReceiver<String>) -> bool {
    print!("Retry connection? [y/N]: ");
    std::io::stdout().flush().ok();

    match input_rx.recv().await {
        Some(line) => is_affirmative(&line),
        None => false,
    }
}

fn is_affirmative(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
