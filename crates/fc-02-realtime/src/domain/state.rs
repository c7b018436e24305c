//! Connection state.

use std::fmt;

/// Lifecycle of the single realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No channel, no handshake in flight.
    #[default]
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Handshake acknowledged and subscriptions established.
    Connected,
}

impl ConnectionState {
    /// Whether a channel is open or opening.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}
