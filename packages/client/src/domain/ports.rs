//! Interfaces the channel manager needs from the REST layer.
//!
//! The domain layer defines them and the infrastructure layer implements
//! them, so the manager can be tested without an HTTP server.

use async_trait::async_trait;

use crate::error::ClientError;

use super::id::{RoomRef, UserId};

/// One message of a room's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub sender: String,
    pub sender_id: UserId,
    pub body: String,
    /// Unix milliseconds, when the server sent a parseable timestamp
    pub sent_at: Option<i64>,
}

/// Token refresh exchange
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange the refresh token for a new access token.
    ///
    /// Fails when no refresh token is stored, when the server refuses the
    /// exchange, or when the response carries no access token.
    async fn refresh_access_token(&self) -> Result<String, ClientError>;
}

/// Room history lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch one page of messages for `room`, oldest first
    async fn fetch_history(
        &self,
        room: &RoomRef,
        page: u32,
        size: u32,
    ) -> Result<Vec<HistoryEntry>, ClientError>;
}
