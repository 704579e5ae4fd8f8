//! The chat view the channel manager renders into.

use super::handshake::ChannelState;
use super::id::RoomRef;

/// Entry point for re-authentication
pub const LOGIN_PATH: &str = "/auth/login";

/// Hard navigation requested by the client logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Rebuild the current view and re-evaluate the auth state
    Reload,
    /// Go back to the login entry point
    Login,
    /// Rebuild the chat view scoped to another room
    ChatRoom(RoomRef),
}

impl Navigation {
    /// Path of the page this navigation leads to
    pub fn target_path(&self) -> String {
        match self {
            Navigation::Reload => ".".to_string(),
            Navigation::Login => LOGIN_PATH.to_string(),
            Navigation::ChatRoom(room) => format!("/chat?room={}", room),
        }
    }
}

/// A message ready to be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub sender: String,
    pub body: String,
    /// Sent by the current user, judged from the untrusted token hint
    pub is_self: bool,
    pub sent_at: Option<i64>,
}

/// Rendering and navigation surface
pub trait ChatView: Send + Sync {
    fn render_message(&self, message: &RenderedMessage);

    fn clear_messages(&self);

    /// Show a blocking, user-visible error notification
    fn notify_error(&self, message: &str);

    fn navigate(&self, target: Navigation);

    fn set_title(&self, _title: &str) {}

    fn update_online_count(&self, _count: u64) {}

    fn connection_changed(&self, _state: ChannelState) {}
}
