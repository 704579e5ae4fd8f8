//! Realtime channel manager.
//!
//! Owns the connection handle and the current room. `connect` runs the
//! handshake with the stored access token and, when the server rejects the
//! credential, performs exactly one refresh and one retry before sending the
//! user back to login.

use std::sync::Arc;

use chatlink_shared::time::parse_server_timestamp;

use crate::{
    domain::{
        ChannelHandle, ChannelState, ChannelTransport, ChatScope, ChatView, ClientEvent,
        HandshakeAttempt, HandshakeDecision, HistorySource, InboundFrame, Navigation,
        OutgoingChat, RenderedMessage, RoomRef, ServerEvent, TokenRefresher, TransportError,
        UserId, decide_on_failure, validation::validate_message_body,
    },
    error::ClientError,
    session::SessionStore,
};

/// History page loaded when entering a room
pub const HISTORY_FIRST_PAGE: u32 = 1;
/// Number of messages loaded when entering a room
pub const HISTORY_PAGE_SIZE: u32 = 50;

/// Collaborators of the channel manager
pub struct ChannelDeps {
    pub session: Arc<SessionStore>,
    pub transport: Arc<dyn ChannelTransport>,
    pub refresher: Arc<dyn TokenRefresher>,
    pub history: Arc<dyn HistorySource>,
    pub view: Arc<dyn ChatView>,
}

pub struct RealtimeChannelManager {
    session: Arc<SessionStore>,
    transport: Arc<dyn ChannelTransport>,
    refresher: Arc<dyn TokenRefresher>,
    history: Arc<dyn HistorySource>,
    view: Arc<dyn ChatView>,
    state: ChannelState,
    scope: ChatScope,
    current_room: RoomRef,
    handle: Option<ChannelHandle>,
}

impl RealtimeChannelManager {
    pub fn new(deps: ChannelDeps, scope: ChatScope) -> Self {
        let current_room = scope.room_ref();
        Self {
            session: deps.session,
            transport: deps.transport,
            refresher: deps.refresher,
            history: deps.history,
            view: deps.view,
            state: ChannelState::Disconnected,
            scope,
            current_room,
            handle: None,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ChannelState::Connected && self.handle.is_some()
    }

    pub fn scope(&self) -> &ChatScope {
        &self.scope
    }

    /// Open the realtime channel with the stored access token.
    ///
    /// Any previous handle is dropped first. On an auth rejection the token is
    /// refreshed once and the handshake retried once; if that is not enough
    /// the view is sent to the login page.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        let Some(mut token) = self.session.access_token() else {
            tracing::warn!("No access token stored, not connecting");
            self.view.notify_error("Not logged in, please log in first");
            self.view.navigate(Navigation::Reload);
            return Err(ClientError::NotLoggedIn);
        };

        // The old connection must not be usable once a new one is attempted
        self.handle = None;
        self.set_state(ChannelState::Connecting);

        let mut attempt = HandshakeAttempt::Initial;
        loop {
            let error = match self.transport.open(&token).await {
                Ok(handle) => {
                    self.handle = Some(handle);
                    self.set_state(ChannelState::Connected);
                    return Ok(());
                }
                Err(e) => e,
            };

            let description = error.to_string();
            match decide_on_failure(attempt, &description) {
                HandshakeDecision::Surface => {
                    tracing::warn!("Handshake failed: {}", description);
                    self.set_state(ChannelState::Disconnected);
                    self.view.notify_error(&format!("Connection failed: {}", description));
                    return Err(error.into());
                }
                HandshakeDecision::RefreshAndRetry => {
                    tracing::warn!("Handshake rejected ({}), refreshing token", description);
                    token = match self.refresher.refresh_access_token().await {
                        Ok(token) => token,
                        Err(e) => return Err(self.redirect_to_login(e)),
                    };
                    if let Err(e) = self.session.store_access_token(&token) {
                        self.set_state(ChannelState::Disconnected);
                        self.view.notify_error(&format!("Failed to store session: {}", e));
                        return Err(e.into());
                    }
                    attempt = HandshakeAttempt::AfterRefresh;
                }
                HandshakeDecision::RedirectToLogin => {
                    tracing::warn!("Handshake rejected again after refresh: {}", description);
                    return Err(self.redirect_to_login(ClientError::SessionExpired));
                }
            }
        }
    }

    /// Drop the connection; the handle can no longer be used for sending
    pub fn disconnect(&mut self) {
        if self.handle.take().is_some() {
            self.set_state(ChannelState::Disconnected);
        }
    }

    /// Wait for the next inbound frame.
    ///
    /// Returns `None` once the connection is gone; the manager is then
    /// `Disconnected`. Without a connection this never resolves.
    pub async fn next_frame(&mut self) -> Option<InboundFrame> {
        let Some(handle) = self.handle.as_mut() else {
            return std::future::pending().await;
        };
        match handle.recv().await {
            Some(frame) => Some(frame),
            None => {
                tracing::info!("Realtime connection closed");
                self.handle = None;
                self.set_state(ChannelState::Disconnected);
                None
            }
        }
    }

    /// Apply one inbound frame to the view
    pub fn dispatch(&self, frame: InboundFrame) {
        match frame {
            InboundFrame::Event(ServerEvent::Chat(chat)) => {
                if chat.room_id != self.current_room {
                    tracing::debug!(
                        "Ignoring message for room {} (current room {})",
                        chat.room_id,
                        self.current_room
                    );
                    return;
                }
                let is_self = self.own_user_id().as_ref() == Some(&chat.sender_id);
                self.view.render_message(&RenderedMessage {
                    sender: chat.sender,
                    body: chat.body,
                    is_self,
                    sent_at: chat.ts.as_deref().and_then(parse_server_timestamp),
                });
            }
            InboundFrame::Event(ServerEvent::NewPrivateChat(event)) => {
                match event.peer() {
                    Some(peer) => {
                        tracing::info!("New private chat with {} in room {}", peer, event.room_id)
                    }
                    None => tracing::info!("New private chat in room {}", event.room_id),
                }
                self.view.navigate(Navigation::ChatRoom(event.room_id));
            }
            InboundFrame::Event(ServerEvent::Online(event)) => {
                self.view.update_online_count(event.count);
            }
            InboundFrame::Unrecognized(text) => {
                tracing::debug!("Dropping unrecognized frame ({} bytes)", text.len());
            }
        }
    }

    /// Send a chat message to the current room
    pub fn send(&self, body: &str) -> Result<(), ClientError> {
        let body = validate_message_body(body)?;
        let handle = self.handle.as_ref().ok_or(TransportError::Closed)?;
        handle.send(ClientEvent::Chat(OutgoingChat {
            body,
            room_id: self.current_room.clone(),
        }))?;
        Ok(())
    }

    /// Rescope the view to `scope` and load the first page of its history
    pub async fn switch_room(&mut self, scope: ChatScope) -> Result<(), ClientError> {
        self.current_room = scope.room_ref();
        self.scope = scope;
        tracing::info!("Switched to room {}", self.current_room);

        self.view.clear_messages();
        self.view.set_title(&self.scope.title());

        let entries = match self
            .history
            .fetch_history(&self.current_room, HISTORY_FIRST_PAGE, HISTORY_PAGE_SIZE)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                self.view.notify_error(&format!("Failed to load history: {}", e));
                if e.requires_login() {
                    self.view.navigate(Navigation::Login);
                }
                return Err(e);
            }
        };

        let own_id = self.own_user_id();
        for entry in entries {
            self.view.render_message(&RenderedMessage {
                is_self: own_id.as_ref() == Some(&entry.sender_id),
                sender: entry.sender,
                body: entry.body,
                sent_at: entry.sent_at,
            });
        }
        Ok(())
    }

    fn own_user_id(&self) -> Option<UserId> {
        self.session.identity_hint().map(|hint| UserId::new(&hint))
    }

    fn redirect_to_login(&mut self, cause: ClientError) -> ClientError {
        self.set_state(ChannelState::Disconnected);
        self.view.notify_error("Login expired, please log in again");
        self.view.navigate(Navigation::Login);
        match cause {
            ClientError::NotLoggedIn => ClientError::NotLoggedIn,
            other => {
                tracing::warn!("Redirecting to login: {}", other);
                ClientError::SessionExpired
            }
        }
    }

    fn set_state(&mut self, state: ChannelState) {
        if self.state != state {
            tracing::info!("Channel state {:?} -> {:?}", self.state, state);
            self.state = state;
            self.view.connection_changed(state);
        }
    }
}
