//! Domain layer: configuration, connection state and message interpretation.

pub mod config;
pub mod messages;
pub mod state;

pub use config::{
    RealtimeConfig, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_RECONNECT_DELAY, DEFAULT_WS_URL,
    FEEDBACK_TOPIC, SESSION_QUEUE,
};
pub use messages::{parse_feedback_update, parse_session_notice, SessionNotice};
pub use state::ConnectionState;
