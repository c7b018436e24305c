//! Claim extraction and expiry evaluation.
//!
//! Tokens are JWT-shaped: `header.payload.signature`, with a base64url JSON
//! payload. Only the payload is read; the signature is not checked.

use crate::error::DecodeError;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Deserialize;
use std::collections::BTreeSet;

/// base64url, padding optional on decode.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims derived from a credential. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Expiry, seconds since the Unix epoch.
    pub expires_at: i64,
    /// Subject (username), when present.
    pub subject: Option<String>,
    /// Role identifiers granted to the subject.
    pub roles: BTreeSet<String>,
}

impl SessionClaims {
    /// Whether the claims are expired at `now` (seconds since epoch).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Whether the claim set grants `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Result of evaluating a token against the current time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// Decodes and has not expired.
    Valid(SessionClaims),
    /// Decodes but the expiry has passed.
    Expired,
    /// Cannot be decoded.
    Malformed(DecodeError),
}

impl TokenStatus {
    /// Whether the token authenticates the session.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Whether the token should be swept from storage.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        !self.is_valid()
    }
}

/// Wire shape of the payload segment.
#[derive(Deserialize)]
struct RawClaims {
    exp: Option<i64>,
    sub: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    role: Option<String>,
}

/// Decode the claim set of a token.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the token is not three segments, the
/// payload is not base64url JSON, or the `exp` claim is missing.
pub fn decode_claims(token: &str) -> Result<SessionClaims, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::MalformedStructure {
            found: segments.len(),
        });
    }

    let payload = PAYLOAD_ENGINE
        .decode(segments[1])
        .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))?;
    let raw: RawClaims =
        serde_json::from_slice(&payload).map_err(|e| DecodeError::InvalidClaims(e.to_string()))?;

    let expires_at = raw.exp.ok_or(DecodeError::MissingExpiry)?;
    let mut roles: BTreeSet<String> = raw.roles.into_iter().collect();
    if let Some(role) = raw.role {
        roles.insert(role);
    }

    Ok(SessionClaims {
        expires_at,
        subject: raw.sub,
        roles,
    })
}

/// Evaluate a token at `now` (seconds since epoch). Pure.
#[must_use]
pub fn evaluate(token: &str, now: i64) -> TokenStatus {
    match decode_claims(token) {
        Ok(claims) if claims.is_expired_at(now) => TokenStatus::Expired,
        Ok(claims) => TokenStatus::Valid(claims),
        Err(e) => TokenStatus::Malformed(e),
    }
}
