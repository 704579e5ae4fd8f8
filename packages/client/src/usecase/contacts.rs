//! Rooms and friends.

use std::sync::Arc;

use crate::{
    domain::{RoomRef, UserId, validation::validate_query},
    error::ClientError,
    infrastructure::{
        ApiClient,
        http::dto::{FriendAction, GroupMatch, HandleFriendResponse, RoomSummary, UserSummary},
    },
};

/// Result of asking to befriend someone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendRequestOutcome {
    /// The request was sent; carries the server's message
    Sent(String),
    /// The user is already in the friend list, nothing was sent
    AlreadyFriends,
}

pub struct ContactsService {
    api: Arc<ApiClient>,
}

impl ContactsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn rooms(&self) -> Result<Vec<RoomSummary>, ClientError> {
        self.api.user_rooms().await
    }

    pub async fn search_groups(&self, query: &str) -> Result<Vec<GroupMatch>, ClientError> {
        let query = validate_query(query)?;
        self.api.search_groups(&query).await
    }

    pub async fn leave_group(&self, room: &RoomRef) -> Result<String, ClientError> {
        self.api.leave_group(room).await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, ClientError> {
        let query = validate_query(query)?;
        self.api.search_users(&query).await
    }

    pub async fn friends(&self) -> Result<Vec<UserSummary>, ClientError> {
        self.api.friends().await
    }

    pub async fn friend_requests(&self) -> Result<Vec<UserSummary>, ClientError> {
        self.api.friend_requests().await
    }

    /// Send a friend request unless the friend list already has `user`.
    ///
    /// The list check and the request are separate calls, so the server may
    /// still refuse the request; its answer wins.
    pub async fn send_friend_request(
        &self,
        user: &UserId,
    ) -> Result<FriendRequestOutcome, ClientError> {
        let friends = self.api.friends().await?;
        if friends.iter().any(|friend| &friend.user_id == user) {
            tracing::debug!("User {} is already a friend", user);
            return Ok(FriendRequestOutcome::AlreadyFriends);
        }
        let msg = self.api.send_friend_request(user).await?;
        Ok(FriendRequestOutcome::Sent(msg))
    }

    /// Answer a pending request; an accepted one may come with a private room
    pub async fn answer_friend_request(
        &self,
        user: &UserId,
        action: FriendAction,
    ) -> Result<HandleFriendResponse, ClientError> {
        let response = self.api.handle_friend_request(user, action).await?;
        if let Some(room) = &response.room_id {
            tracing::info!("Friend request from {} accepted, private room {}", user, room);
        }
        Ok(response)
    }

    pub async fn delete_friend(&self, user: &UserId) -> Result<String, ClientError> {
        self.api.delete_friend(user).await
    }
}
