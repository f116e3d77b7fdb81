//! Message formatting utilities for client display.

use crate::common::time::{timestamp_to_clock, timestamp_to_rfc3339};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown when the session enters a room.
    ///
    /// # Arguments
    ///
    /// * `room_id` - The id of the room the session joined or created
    pub fn format_room_banner(room_id: &str) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str(&format!("Room: {}\n", room_id));
        output.push_str("Share this room ID and password with others to let them join.\n");
        output.push_str("============================================================\n");
        output
    }

    /// Format a chat message received from the relay.
    ///
    /// # Arguments
    ///
    /// * `sender` - The display name of the sender, as echoed by the relay
    /// * `content` - The message content
    /// * `timestamp` - Relay wall-clock time in Unix milliseconds
    pub fn format_chat_message(sender: &str, content: &str, timestamp: i64) -> String {
        format!("\n[{}] {}: {}\n", timestamp_to_clock(timestamp), sender, content)
    }

    /// Format a relay rejection (ERROR frame).
    pub fn format_relay_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    /// Format a disconnect notice with its reason.
    pub fn format_disconnected(reason: &str) -> String {
        format!("\nDisconnected: {} (at {})\n", reason, timestamp_to_rfc3339(now_millis()))
    }

    /// Format a local validation error (nothing was sent to the relay).
    pub fn format_local_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
