//! Interpretation of pushed message bodies.

use crate::error::MessageError;
use serde::Deserialize;
use shared_types::FeedbackUpdateEvent;

/// Message type announcing that the server ended the session.
pub const SESSION_EXPIRED_TYPE: &str = "SESSION_EXPIRED";

/// Server-side session expiry, addressed to this session only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionNotice {
    /// Informational text supplied by the server, if any.
    pub message: Option<String>,
}

/// `{ type, data? }` envelope used on the private queue.
#[derive(Deserialize)]
struct QueueEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Parse a broadcast body into a feedback snapshot.
///
/// # Errors
///
/// Returns [`MessageError::InvalidBody`] if the body is not a feedback item.
pub fn parse_feedback_update(body: &str) -> Result<FeedbackUpdateEvent, MessageError> {
    serde_json::from_str(body).map_err(|e| MessageError::InvalidBody(e.to_string()))
}

/// Parse a private-queue body.
///
/// Returns `Ok(None)` for well-formed messages of any other type.
///
/// # Errors
///
/// Returns [`MessageError::InvalidBody`] if the body is not a queue envelope.
pub fn parse_session_notice(body: &str) -> Result<Option<SessionNotice>, MessageError> {
    let envelope: QueueEnvelope =
        serde_json::from_str(body).map_err(|e| MessageError::InvalidBody(e.to_string()))?;

    if envelope.kind != SESSION_EXPIRED_TYPE {
        return Ok(None);
    }

    let message = match envelope.data {
        Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text),
        _ => None,
    };
    Ok(Some(SessionNotice { message }))
}
