//! Error types for the session subsystem

use thiserror::Error;

/// Reasons a stored token could not be decoded into claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Token must have 3 dot-separated segments, found {found}")]
    MalformedStructure { found: usize },

    #[error("Token payload is not valid base64url: {0}")]
    InvalidEncoding(String),

    #[error("Token payload is not a valid claim set: {0}")]
    InvalidClaims(String),

    #[error("Token has no expiry claim")]
    MissingExpiry,
}

/// Errors surfaced by session checks that must not be swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Stored credential could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}
