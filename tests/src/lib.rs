//! # Event Feedback Client Test Suite
//!
//! Cross-crate scenarios driven through the loopback transport.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs          # Fully wired client around a loopback server
//!     ├── live_views.rs        # Login → connect → pushed updates reach views
//!     └── session_lifecycle.rs # Expiry notices, logout, reconnect gating, resume
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fc-tests
//! cargo test -p fc-tests integration::session_lifecycle::
//! ```

#![allow(dead_code)]

pub mod integration;
