//! Realtime channel configuration.

use crate::error::ConfigError;
use std::time::Duration;

/// Raw WebSocket endpoint of the feedback server's STOMP broker.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws/websocket";

/// Broadcast topic carrying feedback snapshots.
pub const FEEDBACK_TOPIC: &str = "/topic/feedback-updates";

/// Private queue carrying session notices for the current user.
pub const SESSION_QUEUE: &str = "/user/queue/session";

/// Fixed delay before re-entering `Connecting` after a drop.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Time allowed for the server to acknowledge a handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings of the connection manager and its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    /// Endpoint the channel connects to.
    pub url: String,
    /// Delay before an automatic reconnect attempt.
    pub reconnect_delay: Duration,
    /// Handshake acknowledgement deadline (transport adapters).
    pub handshake_timeout: Duration,
    /// Destination of feedback broadcasts.
    pub feedback_topic: String,
    /// Destination of per-session notices.
    pub session_queue: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            feedback_topic: FEEDBACK_TOPIC.to_string(),
            session_queue: SESSION_QUEUE.to_string(),
        }
    }
}

impl RealtimeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        if self.reconnect_delay.is_zero() {
            return Err(ConfigError::ZeroReconnectDelay);
        }
        if self.handshake_timeout.is_zero() {
            return Err(ConfigError::ZeroHandshakeTimeout);
        }
        if self.feedback_topic.is_empty() {
            return Err(ConfigError::EmptyDestination("feedback_topic"));
        }
        if self.session_queue.is_empty() {
            return Err(ConfigError::EmptyDestination("session_queue"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RealtimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_http_url() {
        let config = RealtimeConfig {
            url: "http://localhost:8080/ws".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_zero_delay() {
        let config = RealtimeConfig {
            reconnect_delay: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroReconnectDelay));
    }
}
