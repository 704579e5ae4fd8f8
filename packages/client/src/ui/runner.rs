//! Interactive chat loop with navigation and reconnection support.
//!
//! One readline thread feeds input lines for the whole program. Each chat
//! session owns a fresh channel manager; a navigation request ends the
//! session and the outer loop rebuilds it (reload, room change) or runs the
//! interactive login first.

use std::{sync::Arc, time::Duration};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    domain::{ChannelTransport, ChatScope, InboundFrame, Navigation, RoomRef, TransportError},
    error::ClientError,
    infrastructure::ApiClient,
    usecase::{AuthService, ChannelDeps, RealtimeChannelManager},
};

use super::{
    formatter::MessageFormatter,
    terminal::{TerminalView, redisplay_prompt},
};

const PROMPT: &str = "> ";
const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;
const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// A line typed in the chat view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Quit,
    Help,
    /// `/room <id>`
    SwitchRoom(String),
    Message(String),
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some(("/room", room)) => InputCommand::SwitchRoom(room.trim().to_string()),
            _ => match line {
                "/quit" | "/exit" => InputCommand::Quit,
                "/help" => InputCommand::Help,
                "/room" => InputCommand::SwitchRoom(String::new()),
                _ => InputCommand::Message(line.to_string()),
            },
        }
    }
}

const HELP: &str = concat!(
    "\nCommands:\n",
    "  /room <id>  switch to another room\n",
    "  /help       show this help\n",
    "  /quit       leave the chat\n",
);

/// How a chat session ended
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionEnd {
    Quit,
    Navigate(Navigation),
}

/// What the outer loop does once a session has ended
#[derive(Debug, Clone, PartialEq, Eq)]
enum NextStep {
    Exit,
    /// Rebuild the session for this scope
    Resume(ChatScope),
    /// Renew the token if it is gone, then rebuild the session
    Reload(ChatScope),
    /// Ask for credentials, then rebuild the session
    Login(ChatScope),
}

/// Decide the next step from how the session ended and the scope it was showing
fn next_step(end: SessionEnd, scope: ChatScope) -> NextStep {
    match end {
        SessionEnd::Quit => NextStep::Exit,
        SessionEnd::Navigate(Navigation::Reload) => NextStep::Reload(scope),
        SessionEnd::Navigate(Navigation::Login) => NextStep::Login(scope),
        SessionEnd::Navigate(Navigation::ChatRoom(room)) => {
            NextStep::Resume(ChatScope::Room { room })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReconnectDecision {
    Retry { attempt: u32, delay: Duration },
    GiveUp,
}

/// Bounded reconnect after a lost connection; `attempt` counts from 1
fn reconnect_decision(attempt: u32) -> ReconnectDecision {
    if attempt > MAX_RECONNECT_ATTEMPTS {
        ReconnectDecision::GiveUp
    } else {
        ReconnectDecision::Retry {
            attempt,
            delay: Duration::from_secs(RECONNECT_INTERVAL_SECS),
        }
    }
}

enum SessionInput {
    Frame(Option<InboundFrame>),
    Navigate(Navigation),
    Line(Option<String>),
}

/// Spawn the blocking readline thread; lines arrive on the returned channel
fn spawn_readline() -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Run the interactive chat until the user quits
pub async fn run_chat(
    api: Arc<ApiClient>,
    transport: Arc<dyn ChannelTransport>,
    scope: ChatScope,
) -> Result<(), ClientError> {
    let mut input_rx = spawn_readline();
    let mut scope = scope;

    loop {
        let (end, last_scope) =
            run_session(&api, transport.clone(), scope, &mut input_rx).await?;
        scope = match next_step(end, last_scope) {
            NextStep::Exit => {
                tracing::info!("Chat session ended normally");
                return Ok(());
            }
            NextStep::Resume(next) => {
                tracing::info!("Opening {}", next.title());
                next
            }
            NextStep::Reload(next) => {
                tracing::info!("Reloading chat view");
                let has_token = api.session().access_token().is_some();
                if !has_token && api.refresh_session().await.is_err() {
                    interactive_login(&api, &mut input_rx).await?;
                }
                next
            }
            NextStep::Login(next) => {
                interactive_login(&api, &mut input_rx).await?;
                next
            }
        };
    }
}

async fn run_session(
    api: &Arc<ApiClient>,
    transport: Arc<dyn ChannelTransport>,
    scope: ChatScope,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(SessionEnd, ChatScope), ClientError> {
    let (navigation_tx, mut navigation_rx) = mpsc::unbounded_channel();
    let view = Arc::new(TerminalView::new(PROMPT, navigation_tx));
    let mut manager = RealtimeChannelManager::new(
        ChannelDeps {
            session: api.session().clone(),
            transport,
            refresher: api.clone(),
            history: api.clone(),
            view,
        },
        scope.clone(),
    );

    if let Err(e) = manager.connect().await {
        if let Ok(navigation) = navigation_rx.try_recv() {
            return Ok((SessionEnd::Navigate(navigation), scope));
        }
        return Err(e);
    }
    if let Err(e) = manager.switch_room(scope.clone()).await {
        if let Ok(navigation) = navigation_rx.try_recv() {
            return Ok((SessionEnd::Navigate(navigation), scope));
        }
        tracing::warn!("History unavailable: {}", e);
    }
    println!("\nType messages and press Enter to send. Type /help for commands.\n");
    redisplay_prompt(PROMPT);

    let mut reconnect_count = 0;
    loop {
        if !manager.is_connected() {
            reconnect_count += 1;
            match reconnect_decision(reconnect_count) {
                ReconnectDecision::GiveUp => {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(TransportError::Closed.into());
                }
                ReconnectDecision::Retry { attempt, delay } => {
                    tracing::info!(
                        "Reconnecting in {} seconds... (attempt {}/{})",
                        delay.as_secs(),
                        attempt,
                        MAX_RECONNECT_ATTEMPTS
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            match manager.connect().await {
                Ok(()) => reconnect_count = 0,
                Err(e) => {
                    if let Ok(navigation) = navigation_rx.try_recv() {
                        return Ok((SessionEnd::Navigate(navigation), manager.scope().clone()));
                    }
                    tracing::warn!("Reconnect failed: {}", e);
                }
            }
            continue;
        }

        let input = tokio::select! {
            frame = manager.next_frame() => SessionInput::Frame(frame),
            Some(navigation) = navigation_rx.recv() => SessionInput::Navigate(navigation),
            line = input_rx.recv() => SessionInput::Line(line),
        };

        match input {
            SessionInput::Frame(Some(frame)) => manager.dispatch(frame),
            SessionInput::Frame(None) => tracing::warn!("Connection lost"),
            SessionInput::Navigate(navigation) => {
                return Ok((SessionEnd::Navigate(navigation), manager.scope().clone()));
            }
            SessionInput::Line(None) => {
                manager.disconnect();
                return Ok((SessionEnd::Quit, manager.scope().clone()));
            }
            SessionInput::Line(Some(line)) => match InputCommand::parse(&line) {
                InputCommand::Quit => {
                    manager.disconnect();
                    return Ok((SessionEnd::Quit, manager.scope().clone()));
                }
                InputCommand::Help => {
                    print!("{}", HELP);
                    redisplay_prompt(PROMPT);
                }
                InputCommand::SwitchRoom(raw) => match RoomRef::parse(&raw) {
                    Ok(room) => {
                        // Failures are already shown by the manager
                        if let Err(e) = manager.switch_room(ChatScope::Room { room }).await {
                            tracing::debug!("Room switch failed: {}", e);
                        }
                        redisplay_prompt(PROMPT);
                    }
                    Err(e) => {
                        eprint!("{}", MessageFormatter::format_error(&e.to_string()));
                        redisplay_prompt(PROMPT);
                    }
                },
                InputCommand::Message(body) => {
                    if let Err(e) = manager.send(&body) {
                        eprint!("{}", MessageFormatter::format_error(&e.to_string()));
                    }
                    redisplay_prompt(PROMPT);
                }
            },
        }
    }
}

/// Ask for credentials on the terminal until a login succeeds
async fn interactive_login(
    api: &Arc<ApiClient>,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let auth = AuthService::new(api.clone());

    for attempt in 1..=MAX_LOGIN_ATTEMPTS {
        println!("\nPlease log in ({}/{}).", attempt, MAX_LOGIN_ATTEMPTS);
        println!("Username or user id:");
        redisplay_prompt(PROMPT);
        let Some(identifier) = input_rx.recv().await else {
            return Err(ClientError::NotLoggedIn);
        };
        println!("Password:");
        redisplay_prompt(PROMPT);
        let Some(password) = input_rx.recv().await else {
            return Err(ClientError::NotLoggedIn);
        };

        match auth.login(&identifier, &password).await {
            Ok(_) => {
                println!("Logged in.");
                return Ok(());
            }
            Err(e) => eprint!("{}", MessageFormatter::format_error(&e.to_string())),
        }
    }

    Err(ClientError::NotLoggedIn)
}
