//! WebSocket transport adapter for one session attempt.
//!
//! Owns exactly one connection, feeds transport and relay events into the
//! pure session machine one at a time, and executes the requested send
//! effects. When this function returns the connection and its reader are
//! gone, so a later attempt can never observe events from this one. User
//! input is borrowed from the caller's long-lived channel, not owned here,
//! so lines typed between attempts are never lost to a stale reader.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::client::error::ClientError;
use crate::client::machine::{ConnectionState, Effect, Session, SessionEvent};
use crate::protocol::RelayFrame;

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// How a session attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user ended the session (Ctrl+C / Ctrl+D).
    UserExit,
    /// The transport failed or the relay closed the connection.
    ConnectionLost,
    /// The relay rejected a request with an ERROR frame.
    RelayError,
}

/// Run one connection attempt to completion.
///
/// The session must be in `Connecting`. `input_rx` is the client's single
/// user-input channel (see `ui::spawn_input_thread`); it outlives this
/// attempt so the retry prompt and the next attempt read from the same
/// stream of lines. Returns the final session value so the caller can
/// inspect `last_error` and decide whether to offer a retry.
pub async fn run_room_session(
    url: &str,
    session: Session,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(Session, SessionEnd), ClientError> {
    let (ws_stream, _response) = match connect_async(url).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Failed to connect to {}: {}", url, e);
            let (session, _) = session.apply(SessionEvent::TransportClosed {
                error: Some(format!("Connection error: {}", e)),
            });
            return Ok((session, SessionEnd::ConnectionLost));
        }
    };

    tracing::info!("Connected to relay at {}", url);

    let (mut write, mut read) = ws_stream.split();

    // The transport is open; the machine answers with the SET_NAME frame.
    let (mut session, effects) = session.apply(SessionEvent::TransportOpened);
    send_effects(&mut write, &effects).await?;

    loop {
        tokio::select! {
            incoming = read.next() => {
                let event = match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match RelayFrame::from_json(text.as_str()) {
                            Ok(frame) => SessionEvent::Frame(frame),
                            Err(e) => {
                                tracing::warn!("Ignoring malformed relay frame: {}", e);
                                continue;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Server closed the connection");
                        SessionEvent::TransportClosed {
                            error: Some("Server closed the connection".to_string()),
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        SessionEvent::TransportClosed {
                            error: Some(format!("Connection error: {}", e)),
                        }
                    }
                    Some(Ok(_)) => continue,
                };

                let was_in_room = session.state() == ConnectionState::InRoom;
                let messages_before = session.messages().len();

                let (next, effects) = session.apply(event);
                session = next;
                send_effects(&mut write, &effects).await?;

                match session.state() {
                    ConnectionState::InRoom => {
                        if !was_in_room
                            && let Some(room_id) = session.room_id()
                        {
                            print!("{}", MessageFormatter::format_room_banner(room_id));
                            redisplay_prompt(session.display_name());
                        }
                        if session.messages().len() > messages_before
                            && let Some(message) = session.messages().last()
                        {
                            print!(
                                "{}",
                                MessageFormatter::format_chat_message(
                                    &message.sender,
                                    &message.content,
                                    message.timestamp,
                                )
                            );
                            redisplay_prompt(session.display_name());
                        }
                    }
                    ConnectionState::ErrorPresented => {
                        if let Some(message) = session.last_error() {
                            print!("{}", MessageFormatter::format_relay_error(message));
                        }
                        return Ok((session, SessionEnd::RelayError));
                    }
                    ConnectionState::Idle => {
                        if let Some(message) = session.last_error() {
                            print!("{}", MessageFormatter::format_disconnected(message));
                        }
                        return Ok((session, SessionEnd::ConnectionLost));
                    }
                    _ => {}
                }
            }

            line = input_rx.recv() => {
                let Some(line) = line else {
                    // Input thread ended: user-initiated close.
                    let (session, _) = session.apply(SessionEvent::TransportClosed { error: None });
                    return Ok((session, SessionEnd::UserExit));
                };

                match session.submit_chat(&line) {
                    Ok(effect) => {
                        send_effects(&mut write, &[effect]).await?;
                    }
                    Err(e) => {
                        // Local rejection: nothing was sent, the draft stays
                        // in the readline history for the user to recall.
                        print!("{}", MessageFormatter::format_local_error(&e.to_string()));
                        redisplay_prompt(session.display_name());
                    }
                }
            }
        }
    }
}

async fn send_effects<S>(write: &mut S, effects: &[Effect]) -> Result<(), ClientError>
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    for effect in effects {
        let Effect::Send(frame) = effect;
        let json = frame.to_json()?;
        write
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
    }
    Ok(())
}
