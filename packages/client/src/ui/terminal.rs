//! Terminal implementation of `ChatView`.

use std::io::Write;

use tokio::sync::mpsc;

use crate::domain::{ChannelState, ChatView, Navigation, RenderedMessage};

use super::formatter::MessageFormatter;

/// Redisplay the prompt after printing asynchronously received output
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}

/// Prints to stdout and forwards navigations to the session runner
pub struct TerminalView {
    prompt: String,
    navigation_tx: mpsc::UnboundedSender<Navigation>,
}

impl TerminalView {
    pub fn new(prompt: &str, navigation_tx: mpsc::UnboundedSender<Navigation>) -> Self {
        Self {
            prompt: prompt.to_string(),
            navigation_tx,
        }
    }

    fn show(&self, text: &str) {
        print!("{}", text);
        redisplay_prompt(&self.prompt);
    }
}

impl ChatView for TerminalView {
    fn render_message(&self, message: &RenderedMessage) {
        self.show(&MessageFormatter::format_chat_message(message));
    }

    fn clear_messages(&self) {
        // Clear screen and move the cursor home
        print!("\x1B[2J\x1B[H");
        std::io::stdout().flush().ok();
    }

    fn notify_error(&self, message: &str) {
        eprint!("{}", MessageFormatter::format_error(message));
    }

    fn navigate(&self, target: Navigation) {
        tracing::debug!("Navigating to {}", target.target_path());
        if self.navigation_tx.send(target).is_err() {
            tracing::debug!("Navigation dropped, session already ended");
        }
    }

    fn set_title(&self, title: &str) {
        print!("{}", MessageFormatter::format_title(title));
    }

    fn update_online_count(&self, count: u64) {
        self.show(&MessageFormatter::format_online_count(count));
    }

    fn connection_changed(&self, state: ChannelState) {
        if state == ChannelState::Disconnected {
            self.show(&MessageFormatter::format_connection_state(state));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomRef;

    #[test]
    fn test_navigation_is_forwarded() {
        // テスト項目: ナビゲーション要求がランナーへのチャネルに送られる
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let view = TerminalView::new("> ", tx);

        // when (操作):
        view.navigate(Navigation::ChatRoom(RoomRef::from(3)));

        // then (期待する結果):
        assert_eq!(rx.try_recv().unwrap(), Navigation::ChatRoom(RoomRef::from(3)));
    }

    #[test]
    fn test_navigation_after_runner_exit_is_ignored() {
        // テスト項目: ランナー終了後のナビゲーション要求はパニックせずに破棄される
        // given (前提条件):
        let (tx, rx) = mpsc::unbounded_channel();
        let view = TerminalView::new("> ", tx);
        drop(rx);

        // when (操作):
        view.navigate(Navigation::Login);

        // then (期待する結果):
        // no panic
    }
}
