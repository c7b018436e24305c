//! # Shared Types Crate
//!
//! This crate contains the entities exchanged between the feedback server and
//! the client core, plus the navigation targets the session layer redirects to.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Snapshots, not deltas**: A `FeedbackUpdateEvent` always carries the full
//!   state of one feedback item.
//! - **Wire compatibility**: Field names follow the server's camelCase JSON.

pub mod entities;
pub mod routes;

pub use entities::*;
pub use routes::Route;
