//! Outbound ports of the views: server reads and the logout call.

use async_trait::async_trait;
use fc_01_session::Credential;
use shared_types::{EventId, FeedbackItem, FeedbackSummary};
use thiserror::Error;

/// Failure of a server request issued by a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Not authorized")]
    Unauthorized,

    #[error("Event {0} not found")]
    NotFound(EventId),
}

/// Read access to feedback data.
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    /// Current feedback snapshot of an event.
    async fn feedback_for_event(&self, event_id: EventId) -> Result<Vec<FeedbackItem>, FetchError>;

    /// Current sentiment summary of an event.
    async fn summary_for_event(&self, event_id: EventId) -> Result<FeedbackSummary, FetchError>;
}

/// Server-side authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Invalidate the session on the server.
    async fn logout(&self, credential: &Credential) -> Result<(), FetchError>;
}
