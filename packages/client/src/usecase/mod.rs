//! Use cases driving the domain through the infrastructure adapters.

pub mod auth;
pub mod channel_manager;
pub mod contacts;
pub mod profile;

pub use auth::AuthService;
pub use channel_manager::{ChannelDeps, RealtimeChannelManager};
pub use contacts::{ContactsService, FriendRequestOutcome};
pub use profile::ProfileService;
