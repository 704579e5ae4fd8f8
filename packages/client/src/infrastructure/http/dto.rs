//! REST request and response bodies.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{HistoryEntry, RoomRef, UserId};
use chatlink_shared::time::parse_server_timestamp;

/// Common `{code, msg}` envelope carried by every API response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Successful login; the tokens normally arrive as `Set-Cookie` headers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomMember {
    pub user_id: UserId,
    pub username: String,
}

/// A room the current user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomSummary {
    #[serde(alias = "room_id")]
    pub id: RoomRef,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "group_flag", deserialize_with = "deserialize_flag")]
    pub is_group: bool,
    #[serde(default)]
    pub members: Vec<RoomMember>,
}

impl RoomSummary {
    /// Group name, or the other members' names for private rooms
    pub fn display_name(&self, own_id: Option<&UserId>) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let others: Vec<&str> = self
            .members
            .iter()
            .filter(|m| Some(&m.user_id) != own_id)
            .map(|m| m.username.as_str())
            .collect();
        if others.is_empty() {
            format!("Room {}", self.id)
        } else {
            others.join(", ")
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomsResponse {
    #[serde(default)]
    pub rooms: Vec<RoomSummary>,
}

/// A group found by `/rooms/search`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupMatch {
    pub room_id: RoomRef,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupSearchResponse {
    #[serde(default)]
    pub rooms: Vec<GroupMatch>,
}

/// A stored message as returned by `/room_history`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryMessage {
    pub sender: String,
    pub sender_id: UserId,
    pub body: String,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub seq: Option<i64>,
}

impl From<HistoryMessage> for HistoryEntry {
    fn from(message: HistoryMessage) -> Self {
        HistoryEntry {
            sent_at: message.ts.as_deref().and_then(parse_server_timestamp),
            sender: message.sender,
            sender_id: message.sender_id,
            body: message.body,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub data: Vec<HistoryMessage>,
    #[serde(default)]
    pub has_more: bool,
}

/// A user as listed by friend and search endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FriendsResponse {
    #[serde(default)]
    pub friends: Vec<UserSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FriendRequestsResponse {
    #[serde(default)]
    pub requests: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct FriendTarget<'a> {
    pub friend_user_id: &'a UserId,
}

/// Older servers read `friend_id` on delete, newer ones `friend_user_id`
#[derive(Debug, Serialize)]
pub struct DeleteFriendRequest<'a> {
    pub friend_user_id: &'a UserId,
    pub friend_id: &'a UserId,
}

/// Answer to a pending friend request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendAction {
    Accept,
    Reject,
}

#[derive(Debug, Serialize)]
pub struct HandleFriendRequest<'a> {
    pub user_id: &'a UserId,
    pub action: FriendAction,
}

/// Reply to an answered friend request; accepting opens a private room
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HandleFriendResponse {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub room_id: Option<RoomRef>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsernameRequest<'a> {
    pub new_username: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RoomTarget<'a> {
    pub room_id: &'a RoomRef,
}

/// Accept `true`/`false` as well as `0`/`1` for group flags
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Number(n) => n != 0,
    })
}
