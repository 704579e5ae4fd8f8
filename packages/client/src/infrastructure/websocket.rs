//! WebSocket implementation of `ChannelTransport`.
//!
//! Frames are JSON envelopes `{"event": ..., "data": ...}`. The access token
//! travels in the `token` query parameter of the handshake request. Each open
//! connection is driven by a reader task and a writer task that bridge the
//! socket to the `ChannelHandle` returned to the caller.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::domain::{
    ChannelHandle, ChannelTransport, ClientEvent, InboundFrame, RemoteEnd, ServerEvent,
    TransportError,
};

/// Query parameter carrying the access token during the handshake
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Opens realtime connections with `tokio-tungstenite`
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    endpoint: Url,
}

impl WebSocketTransport {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    fn handshake_url(&self, access_token: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(TOKEN_QUERY_PARAM, access_token);
        url
    }
}

/// Event names this client acts on
const KNOWN_EVENTS: [&str; 3] = ["chat", "new_private_chat", "online"];

/// Decode a text frame into a known event, keeping unknown ones as raw text
pub fn decode_frame(text: &str) -> InboundFrame {
    match serde_json::from_str::<ServerEvent>(text) {
        Ok(event) => InboundFrame::Event(event),
        Err(e) => {
            let name = serde_json::from_str::<serde_json::Value>(text)
                .ok()
                .and_then(|v| v.get("event").and_then(|n| n.as_str()).map(str::to_string));
            match name {
                // A known event with a payload we cannot read is a protocol problem
                Some(name) if KNOWN_EVENTS.contains(&name.as_str()) => {
                    tracing::warn!("Malformed '{}' frame: {}", name, e);
                }
                _ => tracing::debug!("Unrecognized frame: {}", e),
            }
            InboundFrame::Unrecognized(text.to_string())
        }
    }
}

#[async_trait]
impl ChannelTransport for WebSocketTransport {
    async fn open(&self, access_token: &str) -> Result<ChannelHandle, TransportError> {
        match self.endpoint.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(TransportError::InvalidEndpoint(format!(
                    "unsupported scheme '{other}'"
                )));
            }
        }

        let url = self.handshake_url(access_token);
        tracing::debug!("Opening realtime connection to {}", self.endpoint);

        // The error text keeps the HTTP status, e.g. "HTTP error: 401 Unauthorized"
        let (ws_stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;

        tracing::info!("Connected to realtime endpoint {}", self.endpoint);

        let (mut write, mut read) = ws_stream.split();
        let (handle, RemoteEnd { inbound, mut outbound }) = ChannelHandle::pair();

        // Spawn a task to forward incoming frames to the handle
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let frame = match message {
                    Ok(Message::Text(text)) => decode_frame(text.as_str()),
                    Ok(Message::Binary(data)) => {
                        tracing::debug!("Dropping binary frame ({} bytes)", data.len());
                        continue;
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    _ => continue,
                };
                if inbound.send(frame).is_err() {
                    // Handle dropped
                    break;
                }
            }
        });

        // Spawn a task to serialize outgoing events onto the socket
        tokio::spawn(async move {
            while let Some(event) = outbound.recv().await {
                let json = match encode_event(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize event: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send event: {}", e);
                    return;
                }
            }

            // The handle was dropped, so nobody can send on this connection
            if let Err(e) = write.send(Message::Close(None)).await {
                tracing::debug!("Close frame not sent: {}", e);
            }
        });

        Ok(handle)
    }
}

/// Serialize an outgoing event into a text frame payload
pub fn encode_event(event: &ClientEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}
