//! Domain layer: identifiers, wire events, the handshake state machine and
//! the interfaces that the infrastructure layer implements.

mod event;
mod handshake;
mod id;
mod ports;
mod token;
mod transport;
pub mod validation;
mod view;

pub use event::{
    ChatEvent, ClientEvent, NewPrivateChatEvent, OnlineEvent, OutgoingChat, ServerEvent,
};
pub use handshake::{
    ChannelState, HandshakeAttempt, HandshakeDecision, decide_on_failure, is_auth_rejection,
};
pub use id::{ChatScope, GLOBAL_ROOM_ID, RoomRef, UserId};
pub use ports::{HistoryEntry, HistorySource, TokenRefresher};
pub use token::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, TokenPair, UnverifiedClaims};
pub use transport::{ChannelHandle, ChannelTransport, InboundFrame, RemoteEnd, TransportError};
pub use validation::ValidationError;
pub use view::{ChatView, LOGIN_PATH, Navigation, RenderedMessage};

#[cfg(test)]
pub use ports::{MockHistorySource, MockTokenRefresher};
#[cfg(test)]
pub(crate) use token::make_test_token;
