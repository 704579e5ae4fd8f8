//! Terminal chat client library.
//!
//! Provides the session-token store, the thin REST wrapper and the realtime
//! channel manager that reconnects once after a token refresh.

// layers
pub mod domain;
pub mod infrastructure;
pub mod session;
pub mod ui;
pub mod usecase;

// shared
pub mod config;
pub mod error;

pub use error::ClientError;
