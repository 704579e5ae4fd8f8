//! Utilities shared by the chatlink packages.

pub mod logger;
pub mod time;
