//! Adapters Layer: channel connector implementations.

pub mod loopback;
pub mod stomp_ws;

pub use loopback::{loopback, HandshakePolicy, LoopbackConnector, LoopbackServer};
pub use stomp_ws::StompWsConnector;
