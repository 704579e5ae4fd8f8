//! Room and user identifiers.
//!
//! The server sends identifiers either as JSON numbers or as strings, and the
//! chat scope can come from the command line as text. Both forms are
//! normalized to one canonical string so that `5` and `"5"` compare equal.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::validation::ValidationError;

/// Room id of the global chat room
pub const GLOBAL_ROOM_ID: i64 = 1;

/// Identifier as it appears on the wire (number or string)
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    fn canonical(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => canonicalize(&s),
        }
    }
}

fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => n.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

fn serialize_canonical<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    match value.parse::<i64>() {
        Ok(n) => serializer.serialize_i64(n),
        Err(_) => serializer.serialize_str(value),
    }
}

/// Reference to the chat scope currently shown (global room, private peer or group)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomRef(String);

impl RoomRef {
    /// The global chat room
    pub fn global() -> Self {
        Self::from(GLOBAL_ROOM_ID)
    }

    /// Parse a room reference typed by the user
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let canonical = canonicalize(raw);
        if canonical.is_empty() {
            return Err(ValidationError::EmptyRoom);
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form of the reference, if it has one
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn is_global(&self) -> bool {
        self.as_number() == Some(GLOBAL_ROOM_ID)
    }
}

impl From<i64> for RoomRef {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RoomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RoomRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_canonical(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for RoomRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(WireId::deserialize(deserializer)?.canonical()))
    }
}

/// User identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: &str) -> Self {
        Self(canonicalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_canonical(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(WireId::deserialize(deserializer)?.canonical()))
    }
}

/// Which conversation the chat view is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatScope {
    Global,
    Private { peer: UserId },
    Group { room: RoomRef },
    Room { room: RoomRef },
}

impl ChatScope {
    /// Room reference that incoming messages are compared against
    pub fn room_ref(&self) -> RoomRef {
        match self {
            ChatScope::Global => RoomRef::global(),
            ChatScope::Private { peer } => RoomRef(peer.as_str().to_string()),
            ChatScope::Group { room } | ChatScope::Room { room } => room.clone(),
        }
    }

    /// Title shown above the message list
    pub fn title(&self) -> String {
        match self {
            ChatScope::Global => "Global chat".to_string(),
            ChatScope::Private { peer } => format!("Private chat with {}", peer),
            ChatScope::Group { room } => format!("Group: {}", room),
            ChatScope::Room { room } => format!("Room {}", room),
        }
    }
}
