//! Room chat client library.
//!
//! Implements the session client for a password-protected chat room relay:
//! the create/join handshake state machine, the JSON wire codec, and a
//! WebSocket transport adapter. The relay server itself is an external peer.

pub mod client;
pub mod protocol;

// shared library
pub mod common;
