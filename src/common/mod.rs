//! Shared utilities for the room chat client.

pub mod logger;
pub mod time;
