//! Terminal user interface.

pub mod formatter;
pub mod runner;
pub mod terminal;

pub use formatter::MessageFormatter;
pub use runner::run_chat;
pub use terminal::TerminalView;
