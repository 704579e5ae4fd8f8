//! Infrastructure layer: REST and WebSocket adapters for the domain ports.

pub mod http;
pub mod websocket;

pub use http::ApiClient;
pub use websocket::WebSocketTransport;
