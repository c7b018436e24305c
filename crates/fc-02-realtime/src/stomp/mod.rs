//! STOMP 1.2 text framing.
//!
//! Only the frames a subscribing client exchanges are modelled.

pub mod frame;

pub use frame::{Command, FrameError, StompFrame};
