//! Error types for the realtime subsystem

use thiserror::Error;

/// Failures of the underlying channel.
///
/// None of these reach the UI; the connection manager logs them and falls
/// back to `Disconnected`, retrying while the session is authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Failed to reach {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Server rejected the handshake: {0}")]
    Rejected(String),

    #[error("Handshake was not acknowledged within {0:?}")]
    HandshakeTimeout(std::time::Duration),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Channel closed")]
    Closed,
}

/// A pushed message whose body could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("Invalid message body: {0}")]
    InvalidBody(String),
}

/// Invalid realtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Endpoint must be a ws:// or wss:// URL, got {0:?}")]
    InvalidUrl(String),

    #[error("Reconnect delay cannot be zero")]
    ZeroReconnectDelay,

    #[error("Handshake timeout cannot be zero")]
    ZeroHandshakeTimeout,

    #[error("Destination cannot be empty: {0}")]
    EmptyDestination(&'static str),
}
