//! Error types for the room chat client.

use thiserror::Error;

/// Client-side errors.
///
/// Validation variants are raised before any network action and leave the
/// session untouched; `Connection` covers transport-level failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A create/join request was submitted without a display name
    #[error("Display name must not be empty")]
    EmptyDisplayName,

    /// A join request was submitted without a room id
    #[error("Room ID must not be empty")]
    MissingRoomId,

    /// A create/join request was submitted without a password
    #[error("Password must not be empty")]
    MissingPassword,

    /// A chat message was submitted with no content
    #[error("Message must not be empty")]
    EmptyMessage,

    /// A chat message was submitted while not connected to a room
    #[error("Unable to send message: not connected to a room")]
    NotInRoom,

    /// Retry was requested but no room was ever assigned to this session
    #[error("Unable to reconnect: no room to rejoin, please create or join a room again")]
    RetryUnavailable,

    /// Transport-level failure (connect, send, or unexpected close)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The room bootstrap endpoint rejected or failed the request
    #[error("Room bootstrap request failed: {0}")]
    Bootstrap(#[from] reqwest::Error),

    /// An outbound frame could not be serialized
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}
