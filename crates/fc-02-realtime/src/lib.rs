//! # FC-02 Realtime
//!
//! Maintains the single live server channel of the client and feeds pushed
//! updates into the fan-out bus.
//!
//! ## Architecture
//!
//! ```text
//!  SessionGate ──credential──▶ ConnectionManager ──open──▶ ChannelConnector
//!                                   │                          │
//!                                   │◀──── InboundMessage ─────┘
//!                                   │
//!              ┌────────────────────┴────────────────────┐
//!              ▼                                         ▼
//!   /topic/feedback-updates                    /user/queue/session
//!     FeedbackBus::publish                 SessionNoticeSink::session_expired
//! ```
//!
//! - **Domain Layer** (`domain/`): configuration, connection state, message
//!   parsing
//! - **Ports Layer** (`ports/`): channel connector, channel, session gate,
//!   notice sink
//! - **Service Layer** (`service.rs`): `ConnectionManager` state machine
//! - **Adapters Layer** (`adapters/`): STOMP over WebSocket, in-process
//!   loopback
//!
//! ## State Machine
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──ack──▶ Connected
//!      ▲                          │                   │
//!      └──── disconnect() ◀───────┴───── drop ────────┘
//!      │
//!      └── retry after `reconnect_delay` while authenticated
//! ```
//!
//! Every asynchronous completion re-checks the connection epoch under the
//! state lock, so a `disconnect()` always wins over a late acknowledgement or
//! a pending retry.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod stomp;

pub use adapters::{loopback, HandshakePolicy, LoopbackConnector, LoopbackServer, StompWsConnector};
pub use domain::{
    parse_feedback_update, parse_session_notice, ConnectionState, RealtimeConfig, SessionNotice,
    DEFAULT_RECONNECT_DELAY, DEFAULT_WS_URL, FEEDBACK_TOPIC, SESSION_QUEUE,
};
pub use error::{ConfigError, MessageError, TransportError};
pub use ports::{
    ChannelConnector, HandshakeRequest, InboundMessage, RealtimeChannel, SessionGate,
    SessionNoticeSink, SubscriptionSpec,
};
pub use service::ConnectionManager;
