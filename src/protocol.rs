//! Wire protocol for the room chat relay.
//!
//! Every frame is one JSON object per WebSocket text frame, discriminated by
//! a `type` field. Inbound frames with an unrecognized tag deserialize to
//! [`RelayFrame::Unknown`] so that newer relay message types are ignored
//! instead of breaking the session.

use serde::{Deserialize, Serialize};

/// Messages sent from the client to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientFrame {
    /// Declare the display name for this connection. Always the first frame.
    SetName { name: String },
    /// Ask the relay to create a new room guarded by `password`.
    CreateRoom { password: String },
    /// Ask the relay to join an existing room.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String, password: String },
    /// Post a chat message to the current room.
    #[serde(rename_all = "camelCase")]
    ChatMessage { room_id: String, content: String },
}

/// Messages received from the relay.
///
/// `timestamp` is the relay's wall-clock time in Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayFrame {
    /// The display name was accepted.
    NameSet,
    /// A room was created for us; we are now a member.
    #[serde(rename_all = "camelCase")]
    RoomCreated { room_id: String },
    /// We joined an existing room.
    #[serde(rename_all = "camelCase")]
    RoomJoined { room_id: String },
    /// A chat message fanned out to the room.
    ChatMessage {
        sender: String,
        content: String,
        timestamp: i64,
    },
    /// The relay rejected a request (bad password, room not found, ...).
    Error { message: String },
    /// Any tag this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ClientFrame {
    /// Serialize the frame to its JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl RelayFrame {
    /// Parse a text frame received from the relay.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
