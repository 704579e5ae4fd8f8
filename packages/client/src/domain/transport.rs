//! Realtime transport interface and the connection handle.
//!
//! A `ChannelHandle` is the only way to talk to an open connection. Dropping
//! it closes the outbound side, which makes the transport close the socket,
//! so a replaced handle can never be used for sending again.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::event::{ClientEvent, ServerEvent};

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The handshake with the realtime endpoint failed
    #[error("{0}")]
    Handshake(String),

    /// The realtime endpoint URL could not be built
    #[error("Invalid realtime endpoint: {0}")]
    InvalidEndpoint(String),

    /// The connection is gone; nothing can be sent on it
    #[error("Connection closed")]
    Closed,
}

/// A frame received from the realtime endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// A known event
    Event(ServerEvent),
    /// A text frame that is not a known event
    Unrecognized(String),
}

/// Handle to one open realtime connection
#[derive(Debug)]
pub struct ChannelHandle {
    outbound: mpsc::UnboundedSender<ClientEvent>,
    inbound: mpsc::UnboundedReceiver<InboundFrame>,
}

/// The transport-side ends of a `ChannelHandle`
#[derive(Debug)]
pub struct RemoteEnd {
    /// Frames pushed here are received through the handle
    pub inbound: mpsc::UnboundedSender<InboundFrame>,
    /// Events sent through the handle arrive here
    pub outbound: mpsc::UnboundedReceiver<ClientEvent>,
}

impl ChannelHandle {
    /// Create a handle together with the ends the transport drives
    pub fn pair() -> (ChannelHandle, RemoteEnd) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        (
            ChannelHandle {
                outbound: outbound_tx,
                inbound: inbound_rx,
            },
            RemoteEnd {
                inbound: inbound_tx,
                outbound: outbound_rx,
            },
        )
    }

    /// Queue an event for sending
    pub fn send(&self, event: ClientEvent) -> Result<(), TransportError> {
        self.outbound
            .send(event)
            .map_err(|_| TransportError::Closed)
    }

    /// Receive the next frame; `None` once the connection is closed
    pub async fn recv(&mut self) -> Option<InboundFrame> {
        self.inbound.recv().await
    }
}

/// Opens authenticated connections to the realtime endpoint
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Perform the handshake, presenting `access_token` out of band
    async fn open(&self, access_token: &str) -> Result<ChannelHandle, TransportError>;
}
