//! Session state machine for the room handshake and chat exchange.
//!
//! This module contains pure logic only: [`Session::apply`] maps an inbound
//! event to the next session value plus the frames to send, without touching
//! the network. The transport adapter in `session.rs` owns the actual
//! WebSocket and feeds events in one at a time, so every reachable
//! (state, event) pair can be tested without a connection.

use crate::client::error::ClientError;
use crate::protocol::{ClientFrame, RelayFrame};

/// Connection lifecycle states.
///
/// `Idle` and `InRoom` are the only resting states. `ErrorPresented` is the
/// overlay entered when the relay rejects a request; the transport stays open
/// but the session is not (or no longer) in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    AwaitingNameAck,
    AwaitingRoomAck,
    InRoom,
    ErrorPresented,
}

/// What the user asked the session to do once the name is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAction {
    Create,
    Join { room_id: String },
}

/// Validated user intent for one connection attempt.
#[derive(Debug, Clone)]
pub struct RoomIntent {
    pub display_name: String,
    pub action: RoomAction,
    pub password: String,
}

/// One received chat message.
///
/// `id` is a local, per-session monotonic token; `timestamp` is the relay's
/// wall clock in Unix milliseconds. Entries are append-only in arrival order
/// and are never deduplicated or reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: String,
    pub content: String,
    pub timestamp: i64,
}

/// Externally delivered events the machine reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The transport finished opening.
    TransportOpened,
    /// The transport closed; `error` is set when the close was not clean.
    TransportClosed { error: Option<String> },
    /// A parsed frame arrived from the relay.
    Frame(RelayFrame),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a frame over the open transport.
    Send(ClientFrame),
}

/// The client's view of one room interaction.
///
/// All mutation happens through [`Session::apply`] and the validated action
/// methods; the UI layer only reads the accessors.
#[derive(Debug, Clone)]
pub struct Session {
    display_name: String,
    action: RoomAction,
    password: String,
    state: ConnectionState,
    /// Set only while `InRoom`.
    room_id: Option<String>,
    /// Last room id this session was ever a member of; survives disconnects
    /// and drives retry-as-rejoin.
    last_known_room: Option<String>,
    last_error: Option<String>,
    messages: Vec<ChatMessage>,
    next_message_id: u64,
}

impl Session {
    /// Start a new connection attempt from user intent.
    ///
    /// Validation runs before any network action: an empty display name,
    /// password, or (for join) room id is rejected here and nothing is sent.
    /// The returned session is in `Connecting`; the caller opens the
    /// transport and delivers [`SessionEvent::TransportOpened`].
    pub fn connect(intent: RoomIntent) -> Result<Self, ClientError> {
        if intent.display_name.trim().is_empty() {
            return Err(ClientError::EmptyDisplayName);
        }
        if intent.password.trim().is_empty() {
            return Err(ClientError::MissingPassword);
        }
        if let RoomAction::Join { room_id } = &intent.action
            && room_id.trim().is_empty()
        {
            return Err(ClientError::MissingRoomId);
        }

        Ok(Self {
            display_name: intent.display_name,
            action: intent.action,
            password: intent.password,
            state: ConnectionState::Connecting,
            room_id: None,
            last_known_room: None,
            last_error: None,
            messages: Vec::new(),
            next_message_id: 1,
        })
    }

    /// Start a reconnection attempt after a failure.
    ///
    /// Allowed only when a room id was assigned at some point: the new
    /// attempt re-joins that room with the remembered password. If no room
    /// was ever assigned there is nothing to reconnect to and the user must
    /// restart the create/join flow.
    pub fn retry(&self) -> Result<Self, ClientError> {
        let room_id = self
            .last_known_room
            .clone()
            .ok_or(ClientError::RetryUnavailable)?;

        let mut next = Self::connect(RoomIntent {
            display_name: self.display_name.clone(),
            action: RoomAction::Join { room_id },
            password: self.password.clone(),
        })?;
        next.last_known_room = self.last_known_room.clone();
        Ok(next)
    }

    /// Apply one event and return the next session plus requested effects.
    pub fn apply(mut self, event: SessionEvent) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();

        match (self.state, event) {
            (ConnectionState::Connecting, SessionEvent::TransportOpened) => {
                effects.push(Effect::Send(ClientFrame::SetName {
                    name: self.display_name.clone(),
                }));
                self.state = ConnectionState::AwaitingNameAck;
            }

            (ConnectionState::AwaitingNameAck, SessionEvent::Frame(RelayFrame::NameSet)) => {
                let frame = match &self.action {
                    RoomAction::Create => ClientFrame::CreateRoom {
                        password: self.password.clone(),
                    },
                    RoomAction::Join { room_id } => ClientFrame::JoinRoom {
                        room_id: room_id.clone(),
                        password: self.password.clone(),
                    },
                };
                effects.push(Effect::Send(frame));
                self.state = ConnectionState::AwaitingRoomAck;
            }

            (
                ConnectionState::AwaitingRoomAck,
                SessionEvent::Frame(
                    RelayFrame::RoomCreated { room_id } | RelayFrame::RoomJoined { room_id },
                ),
            ) => {
                self.room_id = Some(room_id.clone());
                self.last_known_room = Some(room_id);
                self.last_error = None;
                self.state = ConnectionState::InRoom;
            }

            (
                ConnectionState::InRoom,
                SessionEvent::Frame(RelayFrame::ChatMessage {
                    sender,
                    content,
                    timestamp,
                }),
            ) => {
                let id = self.next_message_id;
                self.next_message_id += 1;
                self.messages.push(ChatMessage {
                    id,
                    sender,
                    content,
                    timestamp,
                });
            }

            // Relay rejection: reachable from any state after Connecting.
            // The transport stays open; the session is out of any room.
            (
                ConnectionState::Connecting
                | ConnectionState::AwaitingNameAck
                | ConnectionState::AwaitingRoomAck
                | ConnectionState::InRoom
                | ConnectionState::ErrorPresented,
                SessionEvent::Frame(RelayFrame::Error { message }),
            ) => {
                self.last_error = Some(message);
                self.room_id = None;
                self.messages.clear();
                self.state = ConnectionState::ErrorPresented;
            }

            (_, SessionEvent::TransportClosed { error }) => {
                if let Some(reason) = error {
                    self.last_error = Some(reason);
                }
                self.room_id = None;
                self.messages.clear();
                self.state = ConnectionState::Idle;
            }

            // Chat frames outside a room and unknown tags carry no meaning
            // for this session; drop them without erroring.
            (_, SessionEvent::Frame(_)) => {}

            // A stray open notification in any other state is stale.
            (_, SessionEvent::TransportOpened) => {}
        }

        (self, effects)
    }

    /// Validate and encode an outgoing chat message.
    ///
    /// Fails locally when the session is not in a room or the draft is
    /// empty; the caller keeps the draft text on failure so the user can
    /// retry after reconnecting.
    pub fn submit_chat(&self, draft: &str) -> Result<Effect, ClientError> {
        let content = draft.trim();
        if content.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let (ConnectionState::InRoom, Some(room_id)) = (self.state, self.room_id.as_deref())
        else {
            return Err(ClientError::NotInRoom);
        };

        Ok(Effect::Send(ClientFrame::ChatMessage {
            room_id: room_id.to_string(),
            content: content.to_string(),
        }))
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The current room id; `Some` only while `InRoom`.
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// The last room id ever assigned, kept across disconnects for retry.
    pub fn last_known_room(&self) -> Option<&str> {
        self.last_known_room.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Messages received while in the current room, in arrival order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_intent(name: &str) -> RoomIntent {
        RoomIntent {
            display_name: name.to_string(),
            action: RoomAction::Create,
            password: "123456".to_string(),
        }
    }

    fn join_intent(name: &str, room_id: &str) -> RoomIntent {
        RoomIntent {
            display_name: name.to_string(),
            action: RoomAction::Join {
                room_id: room_id.to_string(),
            },
            password: "123456".to_string(),
        }
    }

    /// Drive a fresh create-session through the full handshake.
    fn session_in_room(room_id: &str) -> Session {
        let session = Session::connect(create_intent("Alice")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::NameSet));
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::RoomCreated {
            room_id: room_id.to_string(),
        }));
        session
    }

    #[test]
    fn test_connect_with_empty_display_name_is_rejected() {
        // テスト項目: 表示名が空の場合、接続前にローカルで拒否される
        // given (前提条件):
        let intent = create_intent("   ");

        // when (操作):
        let result = Session::connect(intent);

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::EmptyDisplayName)));
    }

    #[test]
    fn test_connect_with_empty_password_is_rejected() {
        // テスト項目: パスワードが空の場合、接続前にローカルで拒否される
        // given (前提条件):
        let mut intent = create_intent("Alice");
        intent.password = "".to_string();

        // when (操作):
        let result = Session::connect(intent);

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::MissingPassword)));
    }

    #[test]
    fn test_connect_join_with_empty_room_id_is_rejected() {
        // テスト項目: 参加時にルーム ID が空の場合、接続前にローカルで拒否される
        // given (前提条件):
        let intent = join_intent("Alice", "");

        // when (操作):
        let result = Session::connect(intent);

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::MissingRoomId)));
    }

    #[test]
    fn test_transport_open_sends_set_name_first() {
        // テスト項目: トランスポート接続後、最初に SET_NAME が送信される
        // given (前提条件):
        let session = Session::connect(create_intent("Alice")).unwrap();
        assert_eq!(session.state(), ConnectionState::Connecting);

        // when (操作):
        let (session, effects) = session.apply(SessionEvent::TransportOpened);

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::AwaitingNameAck);
        assert_eq!(
            effects,
            vec![Effect::Send(ClientFrame::SetName {
                name: "Alice".to_string()
            })]
        );
    }

    #[test]
    fn test_name_ack_sends_create_room_for_create_intent() {
        // テスト項目: NAME_SET 受信後、作成フローでは CREATE_ROOM が送信される
        // given (前提条件):
        let session = Session::connect(create_intent("Alice")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);

        // when (操作):
        let (session, effects) = session.apply(SessionEvent::Frame(RelayFrame::NameSet));

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::AwaitingRoomAck);
        assert_eq!(
            effects,
            vec![Effect::Send(ClientFrame::CreateRoom {
                password: "123456".to_string()
            })]
        );
    }

    #[test]
    fn test_name_ack_sends_join_room_for_join_intent() {
        // テスト項目: NAME_SET 受信後、参加フローでは JOIN_ROOM が送信される
        // given (前提条件):
        let session = Session::connect(join_intent("Bob", "R1")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);

        // when (操作):
        let (_, effects) = session.apply(SessionEvent::Frame(RelayFrame::NameSet));

        // then (期待する結果):
        assert_eq!(
            effects,
            vec![Effect::Send(ClientFrame::JoinRoom {
                room_id: "R1".to_string(),
                password: "123456".to_string()
            })]
        );
    }

    #[test]
    fn test_scenario_create_flow_reaches_in_room() {
        // テスト項目: 作成フロー完走で InRoom に到達し、roomId が記録される
        // given (前提条件):
        // when (操作):
        let session = session_in_room("R1");

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::InRoom);
        assert_eq!(session.room_id(), Some("R1"));
        assert!(session.messages().is_empty());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_room_joined_also_reaches_in_room() {
        // テスト項目: ROOM_JOINED 受信でも InRoom に遷移する
        // given (前提条件):
        let session = Session::connect(join_intent("Bob", "R1")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::NameSet));

        // when (操作):
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::RoomJoined {
            room_id: "R1".to_string(),
        }));

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::InRoom);
        assert_eq!(session.room_id(), Some("R1"));
    }

    #[test]
    fn test_chat_message_appends_in_arrival_order() {
        // テスト項目: InRoom 中の CHAT_MESSAGE が到着順に追加される
        // given (前提条件):
        let session = session_in_room("R1");

        // when (操作):
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::ChatMessage {
            sender: "Bob".to_string(),
            content: "hi".to_string(),
            timestamp: 1000,
        }));
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::ChatMessage {
            sender: "Alice".to_string(),
            content: "hello".to_string(),
            timestamp: 900,
        }));

        // then (期待する結果): タイムスタンプ順ではなく到着順
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].sender, "Bob");
        assert_eq!(session.messages()[1].sender, "Alice");
    }

    #[test]
    fn test_duplicate_chat_message_produces_two_entries_with_distinct_ids() {
        // テスト項目: 同一内容の CHAT_MESSAGE を2回適用すると、別 ID の2件になる
        // given (前提条件):
        let session = session_in_room("R1");
        let frame = RelayFrame::ChatMessage {
            sender: "Bob".to_string(),
            content: "hi".to_string(),
            timestamp: 1000,
        };

        // when (操作):
        let (session, _) = session.apply(SessionEvent::Frame(frame.clone()));
        let (session, _) = session.apply(SessionEvent::Frame(frame));

        // then (期待する結果): 重複排除は行われない
        assert_eq!(session.messages().len(), 2);
        assert_ne!(session.messages()[0].id, session.messages()[1].id);
    }

    #[test]
    fn test_chat_message_before_in_room_is_ignored() {
        // テスト項目: InRoom 以前に届いた CHAT_MESSAGE は無視される
        // given (前提条件):
        let session = Session::connect(create_intent("Alice")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);

        // when (操作):
        let (session, effects) = session.apply(SessionEvent::Frame(RelayFrame::ChatMessage {
            sender: "Bob".to_string(),
            content: "early".to_string(),
            timestamp: 1000,
        }));

        // then (期待する結果):
        assert!(effects.is_empty());
        assert!(session.messages().is_empty());
        assert_eq!(session.state(), ConnectionState::AwaitingNameAck);
    }

    #[test]
    fn test_relay_error_during_handshake_sets_last_error() {
        // テスト項目: AwaitingRoomAck 中の ERROR で lastError が記録され、入室しない
        // given (前提条件):
        let session = Session::connect(join_intent("Bob", "R1")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::NameSet));

        // when (操作):
        let (session, effects) = session.apply(SessionEvent::Frame(RelayFrame::Error {
            message: "bad password".to_string(),
        }));

        // then (期待する結果):
        assert!(effects.is_empty());
        assert_eq!(session.state(), ConnectionState::ErrorPresented);
        assert_eq!(session.last_error(), Some("bad password"));
        assert_eq!(session.room_id(), None);
    }

    #[test]
    fn test_relay_error_while_in_room_leaves_the_room() {
        // テスト項目: InRoom 中の ERROR で部屋から外れ、再参加用の roomId は保持される
        // given (前提条件):
        let session = session_in_room("R1");

        // when (操作):
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::Error {
            message: "kicked".to_string(),
        }));

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::ErrorPresented);
        assert_eq!(session.room_id(), None);
        assert_eq!(session.last_known_room(), Some("R1"));
    }

    #[test]
    fn test_success_after_error_clears_last_error() {
        // テスト項目: 入室成功で lastError がクリアされる
        // given (前提条件):
        let session = Session::connect(join_intent("Bob", "R1")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::Error {
            message: "slow down".to_string(),
        }));
        let (session, _) = session.apply(SessionEvent::TransportClosed { error: None });
        assert_eq!(session.state(), ConnectionState::Idle);
        assert_eq!(session.last_error(), Some("slow down"));

        // when (操作): 新しい試行が入室まで完走する
        let session = Session::connect(join_intent("Bob", "R1")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::NameSet));
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::RoomJoined {
            room_id: "R1".to_string(),
        }));

        // then (期待する結果):
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_transport_close_resets_to_idle_and_discards_messages() {
        // テスト項目: トランスポート切断で Idle に戻り、メッセージ列が破棄される
        // given (前提条件):
        let session = session_in_room("R1");
        let (session, _) = session.apply(SessionEvent::Frame(RelayFrame::ChatMessage {
            sender: "Bob".to_string(),
            content: "hi".to_string(),
            timestamp: 1000,
        }));

        // when (操作):
        let (session, _) = session.apply(SessionEvent::TransportClosed {
            error: Some("connection lost".to_string()),
        });

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::Idle);
        assert_eq!(session.room_id(), None);
        assert!(session.messages().is_empty());
        assert_eq!(session.last_error(), Some("connection lost"));
    }

    #[test]
    fn test_clean_close_does_not_set_last_error() {
        // テスト項目: 正常切断では lastError が設定されない
        // given (前提条件):
        let session = session_in_room("R1");

        // when (操作):
        let (session, _) = session.apply(SessionEvent::TransportClosed { error: None });

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::Idle);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_retry_after_disconnect_rejoins_last_known_room() {
        // テスト項目: 切断後の再試行は最後の roomId への JOIN_ROOM になる
        // given (前提条件):
        let session = session_in_room("R1");
        let (session, _) = session.apply(SessionEvent::TransportClosed {
            error: Some("connection lost".to_string()),
        });

        // when (操作):
        let retried = session.retry().unwrap();
        let (retried, _) = retried.apply(SessionEvent::TransportOpened);
        let (retried, effects) = retried.apply(SessionEvent::Frame(RelayFrame::NameSet));

        // then (期待する結果): 再作成ではなく再参加
        assert_eq!(retried.state(), ConnectionState::AwaitingRoomAck);
        assert_eq!(
            effects,
            vec![Effect::Send(ClientFrame::JoinRoom {
                room_id: "R1".to_string(),
                password: "123456".to_string()
            })]
        );
    }

    #[test]
    fn test_retry_without_assigned_room_is_rejected() {
        // テスト項目: roomId が一度も割り当てられていない場合、再試行は拒否される
        // given (前提条件):
        let session = Session::connect(create_intent("Alice")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportClosed {
            error: Some("connection refused".to_string()),
        });

        // when (操作):
        let result = session.retry();

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::RetryUnavailable)));
    }

    #[test]
    fn test_submit_chat_while_in_room_produces_frame() {
        // テスト項目: InRoom 中の送信で CHAT_MESSAGE フレームが生成される
        // given (前提条件):
        let session = session_in_room("R1");

        // when (操作):
        let effect = session.submit_chat("hello there").unwrap();

        // then (期待する結果):
        assert_eq!(
            effect,
            Effect::Send(ClientFrame::ChatMessage {
                room_id: "R1".to_string(),
                content: "hello there".to_string()
            })
        );
    }

    #[test]
    fn test_submit_chat_outside_room_is_rejected() {
        // テスト項目: InRoom 以外での送信はローカルエラーになり、フレームは生成されない
        // given (前提条件):
        let session = Session::connect(create_intent("Alice")).unwrap();
        let (session, _) = session.apply(SessionEvent::TransportOpened);
        let draft = "hello";

        // when (操作):
        let result = session.submit_chat(draft);

        // then (期待する結果): 呼び出し側はドラフトを保持したまま
        assert!(matches!(result, Err(ClientError::NotInRoom)));
        assert_eq!(draft, "hello");
    }

    #[test]
    fn test_submit_empty_chat_is_rejected() {
        // テスト項目: 空メッセージの送信はローカルで拒否される
        // given (前提条件):
        let session = session_in_room("R1");

        // when (操作):
        let result = session.submit_chat("   ");

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::EmptyMessage)));
    }

    #[test]
    fn test_unknown_frame_is_ignored_in_every_state() {
        // テスト項目: 未知のフレームはどの状態でも無視される
        // given (前提条件):
        let session = session_in_room("R1");
        let before = session.state();

        // when (操作):
        let (session, effects) = session.apply(SessionEvent::Frame(RelayFrame::Unknown));

        // then (期待する結果):
        assert!(effects.is_empty());
        assert_eq!(session.state(), before);
    }
}
