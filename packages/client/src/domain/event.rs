//! Realtime channel events.
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use super::id::{RoomRef, UserId};

/// Events pushed by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A chat message posted to some room
    Chat(ChatEvent),
    /// A private room was created for us; the view must move to it
    NewPrivateChat(NewPrivateChatEvent),
    /// Number of users currently online
    Online(OnlineEvent),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatEvent {
    pub room_id: RoomRef,
    pub sender: String,
    pub sender_id: UserId,
    pub body: String,
    #[serde(default)]
    pub ts: Option<String>,
}

/// Servers name the other user `friend_user_id`, `peer_user_id`, or both
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPrivateChatEvent {
    pub room_id: RoomRef,
    #[serde(default)]
    pub friend_user_id: Option<UserId>,
    #[serde(default)]
    pub peer_user_id: Option<UserId>,
}

impl NewPrivateChatEvent {
    /// The other member of the new room, whichever name carried it
    pub fn peer(&self) -> Option<&UserId> {
        self.peer_user_id.as_ref().or(self.friend_user_id.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OnlineEvent {
    pub count: u64,
}

/// Events emitted by the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Chat(OutgoingChat),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingChat {
    pub body: String,
    pub room_id: RoomRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chat_event() {
        // テスト項目: chat イベントが正しくデシリアライズされる
        // given (前提条件):
        let frame = json!({
            "event": "chat",
            "data": {"room_id": 5, "sender": "alice", "sender_id": 5, "body": "hi"}
        });

        // when (操作):
        let event: ServerEvent = serde_json::from_value(frame).unwrap();

        // then (期待する結果):
        let ServerEvent::Chat(chat) = event else {
            panic!("expected chat event");
        };
        assert_eq!(chat.room_id, RoomRef::from(5));
        assert_eq!(chat.sender, "alice");
        assert_eq!(chat.sender_id, UserId::from(5));
        assert_eq!(chat.body, "hi");
        assert!(chat.ts.is_none());
    }

    #[test]
    fn test_parse_new_private_chat_with_friend_user_id() {
        // テスト項目: friend_user_id を持つ new_private_chat イベントが読める
        // given (前提条件):
        let frame = json!({
            "event": "new_private_chat",
            "data": {"room_id": "12", "friend_user_id": "1002"}
        });

        // when (操作):
        let event: ServerEvent = serde_json::from_value(frame).unwrap();

        // then (期待する結果):
        let ServerEvent::NewPrivateChat(new_room) = event else {
            panic!("expected new_private_chat event");
        };
        assert_eq!(new_room.room_id, RoomRef::from(12));
        assert_eq!(new_room.peer(), Some(&UserId::from(1002)));
    }

    #[test]
    fn test_parse_new_private_chat_with_peer_user_id() {
        // テスト項目: peer_user_id を持つ new_private_chat イベントも読める
        // given (前提条件):
        let frame = json!({
            "event": "new_private_chat",
            "data": {"room_id": 12, "peer_user_id": 7}
        });

        // when (操作):
        let event: ServerEvent = serde_json::from_value(frame).unwrap();

        // then (期待する結果):
        let ServerEvent::NewPrivateChat(new_room) = event else {
            panic!("expected new_private_chat event");
        };
        assert_eq!(new_room.peer(), Some(&UserId::from(7)));
    }

    #[test]
    fn test_parse_new_private_chat_with_both_peer_fields() {
        // テスト項目: friend_user_id と peer_user_id の両方を持つ new_private_chat イベントも読める
        // given (前提条件):
        let frame = json!({
            "event": "new_private_chat",
            "data": {
                "room_id": 7,
                "user_id": "1001",
                "friend_user_id": "1002",
                "peer_user_id": "1002"
            }
        });

        // when (操作):
        let event: ServerEvent = serde_json::from_value(frame).unwrap();

        // then (期待する結果):
        let ServerEvent::NewPrivateChat(new_room) = event else {
            panic!("expected new_private_chat event");
        };
        assert_eq!(new_room.room_id, RoomRef::from(7));
        assert_eq!(new_room.peer(), Some(&UserId::from(1002)));
    }

    #[test]
    fn test_unknown_event_fails_to_parse() {
        // テスト項目: 未知のイベント名はデシリアライズに失敗する
        // given (前提条件):
        let frame = json!({"event": "typing", "data": {"user_id": 1}});

        // when (操作):
        let result = serde_json::from_value::<ServerEvent>(frame);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_outgoing_chat() {
        // テスト項目: 送信する chat イベントが body と room_id を持つ
        // given (前提条件):
        let event = ClientEvent::Chat(OutgoingChat {
            body: "hello".to_string(),
            room_id: RoomRef::from(1),
        });

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"event": "chat", "data": {"body": "hello", "room_id": 1}})
        );
    }
}
