//! # FC-01 Session
//!
//! Client-side credential lifecycle: token storage, expiry detection, role
//! extraction and forced logout.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure token decoding, no I/O
//!   - `Credential`: The opaque bearer token
//!   - `SessionClaims`, `TokenStatus`: Decoded and evaluated claims
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `ClientStorage`: Local key/value persistence
//!   - `Clock`: Wall-clock source for expiry checks
//!   - `Navigator`: Redirects issued on logout and by guards
//!
//! - **Service Layer** (`service.rs`):
//!   - `CredentialStore`: The only owner of the persisted credential
//!   - `SessionEvaluator`: Authentication and role checks
//!
//! - **Adapters Layer** (`adapters/`): In-memory and file storage, clocks,
//!   a recording navigator
//!
//! ## Trust Model
//!
//! Token signatures are never verified here. Role checks are UX hints; the
//! server remains the only authorization boundary.
//!
//! ## Usage Example
//!
//! ```ignore
//! use fc_01_session::{InMemoryClientStorage, RecordingNavigator, SessionEvaluator, SystemClock};
//! use std::sync::Arc;
//!
//! let session = SessionEvaluator::new(
//!     Arc::new(InMemoryClientStorage::new()),
//!     Arc::new(SystemClock),
//!     Arc::new(RecordingNavigator::new()),
//! );
//! session.store().set(token);
//! if session.is_authenticated() {
//!     // connect the realtime channel
//! }
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod guards;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{FileClientStorage, FixedClock, InMemoryClientStorage, RecordingNavigator, SystemClock};
pub use domain::{decode_claims, evaluate, Credential, SessionClaims, TokenStatus};
pub use error::{DecodeError, SessionError};
pub use guards::{GuardOutcome, RouteGuard};
pub use ports::{ClientStorage, Clock, Navigator};
pub use service::{CredentialStore, SessionEvaluator};

/// Storage key holding the bearer token.
pub const CREDENTIAL_KEY: &str = "token";

/// Role identifier granting administrative pages.
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";
