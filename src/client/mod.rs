//! Room chat client implementation.

mod bootstrap;
mod error;
mod formatter;
mod machine;
mod runner;
mod session;
mod ui;

pub use bootstrap::{RoomCredentials, generate_room_credentials};
pub use error::ClientError;
pub use machine::{
    ChatMessage, ConnectionState, Effect, RoomAction, RoomIntent, Session, SessionEvent,
};
pub use runner::{RunOptions, run_client};
pub use session::{SessionEnd, run_room_session};
