//! Message formatting utilities for terminal display.

use chatlink_shared::time::format_local_clock;

use crate::{
    domain::{ChannelState, RenderedMessage, UserId},
    infrastructure::http::dto::{GroupMatch, RoomSummary, UserSummary},
};

const RULE: &str = "============================================================";

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown when a chat view is opened
    pub fn format_title(title: &str) -> String {
        format!("\n{}\n{}\n{}\n", RULE, title, RULE)
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `message` - The message to show; own messages get a `(me)` marker
    ///
    /// # Returns
    ///
    /// A formatted line such as `[12:00:00] @alice (me): hi`
    pub fn format_chat_message(message: &RenderedMessage) -> String {
        let clock = message
            .sent_at
            .map(format_local_clock)
            .unwrap_or_else(|| "--:--:--".to_string());
        let me_suffix = if message.is_self { " (me)" } else { "" };
        format!(
            "\n[{}] @{}{}: {}\n",
            clock, message.sender, me_suffix, message.body
        )
    }

    pub fn format_online_count(count: u64) -> String {
        let noun = if count == 1 { "user" } else { "users" };
        format!("\n* {} {} online\n", count, noun)
    }

    pub fn format_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    pub fn format_connection_state(state: ChannelState) -> String {
        let text = match state {
            ChannelState::Disconnected => "disconnected",
            ChannelState::Connecting => "connecting...",
            ChannelState::Connected => "connected",
        };
        format!("\n~ {}\n", text)
    }

    /// Format the room list; private rooms are named after the other members
    pub fn format_rooms(rooms: &[RoomSummary], own_id: Option<&UserId>) -> String {
        if rooms.is_empty() {
            return "(No rooms)\n".to_string();
        }
        rooms
            .iter()
            .map(|room| {
                let kind = if room.is_group { "group" } else { "private" };
                format!("{:>6}  {:<8} {}\n", room.id, kind, room.display_name(own_id))
            })
            .collect()
    }

    pub fn format_groups(groups: &[GroupMatch]) -> String {
        if groups.is_empty() {
            return "(No groups found)\n".to_string();
        }
        groups
            .iter()
            .map(|group| {
                format!(
                    "{:>6}  {}\n",
                    group.room_id,
                    group.name.as_deref().unwrap_or("(unnamed)")
                )
            })
            .collect()
    }

    pub fn format_users(users: &[UserSummary], empty: &str) -> String {
        if users.is_empty() {
            return format!("({})\n", empty);
        }
        users
            .iter()
            .map(|user| format!("{:>6}  {}\n", user.user_id, user.username))
            .collect()
    }
}
