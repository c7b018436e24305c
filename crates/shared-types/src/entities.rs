//! # Core Domain Entities
//!
//! Defines the feedback entities pushed by the server and fetched by views.
//!
//! ## Clusters
//!
//! - **Identifiers**: `EventId`, `FeedbackId`
//! - **Feedback**: `FeedbackUpdateEvent`, `FeedbackItem`, `SentimentType`
//! - **Aggregates**: `FeedbackSummary`

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of an event that feedback is submitted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a random identifier.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a single feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(pub Uuid);

impl FeedbackId {
    /// Generate a random identifier.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// FEEDBACK
// =============================================================================

/// Sentiment classification assigned by the server.
///
/// Feedback starts as `Pending` and is re-published once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentType {
    /// Classification has not finished yet.
    Pending,
    /// Positive feedback.
    Positive,
    /// Neutral feedback.
    Neutral,
    /// Negative feedback.
    Negative,
}

impl SentimentType {
    /// Whether the server has finished classifying this item.
    #[must_use]
    pub fn is_classified(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Full replacement snapshot of one feedback item.
///
/// Published on `/topic/feedback-updates` whenever the server changes an item.
/// Consumers treat the latest-received value as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackUpdateEvent {
    /// Feedback item identifier (`id` on the wire).
    #[serde(rename = "id", alias = "feedbackId")]
    pub feedback_id: FeedbackId,
    /// Event the feedback belongs to. Older servers omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// Feedback text.
    pub content: String,
    /// Server-side creation time (local date-time, no offset).
    pub created_at: NaiveDateTime,
    /// Current sentiment classification.
    pub sentiment_type: SentimentType,
}

impl FeedbackUpdateEvent {
    /// Whether this update belongs to the given event.
    #[must_use]
    pub fn concerns(&self, event_id: EventId) -> bool {
        self.event_id == Some(event_id)
    }
}

/// A feedback item as held in a list view.
///
/// Same shape as the update event: list reconciliation replaces items
/// wholesale with the received snapshot.
pub type FeedbackItem = FeedbackUpdateEvent;

// =============================================================================
// AGGREGATES
// =============================================================================

/// Sentiment distribution for one event, recomputed server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    /// Event this summary describes.
    pub event_id: EventId,
    /// Total feedback items, including pending ones.
    pub total_feedback_count: u64,
    /// Items classified positive.
    pub positive_count: u64,
    /// Items classified neutral.
    pub neutral_count: u64,
    /// Items classified negative.
    pub negative_count: u64,
}

impl FeedbackSummary {
    /// Items still awaiting classification.
    #[must_use]
    pub fn pending_count(&self) -> u64 {
        self.total_feedback_count.saturating_sub(
            self.positive_count + self.neutral_count + self.negative_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPDATE_JSON: &str = r#"{
        "id": "7d3f2a56-3c1e-4a8b-9e55-0c4f6f1b2a10",
        "eventId": "b5a1c3e2-1111-4d2a-8f00-9a9b8c7d6e5f",
        "content": "Great talk",
        "createdAt": "2025-06-01T10:15:30.123456",
        "sentimentType": "POSITIVE"
    }"#;

    #[test]
    fn test_update_event_parses_server_payload() {
        let event: FeedbackUpdateEvent = serde_json::from_str(UPDATE_JSON).unwrap();
        assert_eq!(event.content, "Great talk");
        assert_eq!(event.sentiment_type, SentimentType::Positive);
        assert!(event.event_id.is_some());
        assert_eq!(
            event.feedback_id.to_string(),
            "7d3f2a56-3c1e-4a8b-9e55-0c4f6f1b2a10"
        );
    }

    #[test]
    fn test_update_event_without_event_id() {
        let json = r#"{
            "id": "7d3f2a56-3c1e-4a8b-9e55-0c4f6f1b2a10",
            "content": "Too long",
            "createdAt": "2025-06-01T10:15:30",
            "sentimentType": "PENDING"
        }"#;
        let event: FeedbackUpdateEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_id, None);
        assert!(!event.concerns(EventId::new_v4()));
        assert!(!event.sentiment_type.is_classified());
    }

    #[test]
    fn test_update_event_accepts_feedback_id_alias() {
        let json = UPDATE_JSON.replace("\"id\"", "\"feedbackId\"");
        let event: FeedbackUpdateEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(
            event.feedback_id.to_string(),
            "7d3f2a56-3c1e-4a8b-9e55-0c4f6f1b2a10"
        );
    }

    #[test]
    fn test_unknown_sentiment_is_rejected() {
        let json = UPDATE_JSON.replace("POSITIVE", "ECSTATIC");
        assert!(serde_json::from_str::<FeedbackUpdateEvent>(&json).is_err());
    }

    #[test]
    fn test_summary_pending_count() {
        let summary = FeedbackSummary {
            event_id: EventId::new_v4(),
            total_feedback_count: 10,
            positive_count: 4,
            neutral_count: 2,
            negative_count: 1,
        };
        assert_eq!(summary.pending_count(), 3);
    }
}
