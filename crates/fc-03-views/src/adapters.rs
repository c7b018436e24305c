//! In-memory port implementations for demos and tests.

use crate::ports::{AuthApi, FeedbackSource, FetchError};
use async_trait::async_trait;
use fc_01_session::Credential;
use parking_lot::RwLock;
use shared_types::{EventId, FeedbackItem, FeedbackSummary};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Feedback data held in process.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackSource {
    feedback: RwLock<HashMap<EventId, Vec<FeedbackItem>>>,
    summaries: RwLock<HashMap<EventId, FeedbackSummary>>,
    failure: RwLock<Option<FetchError>>,
    feedback_fetches: AtomicU64,
    summary_fetches: AtomicU64,
}

impl InMemoryFeedbackSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feedback list of an event.
    pub fn set_feedback(&self, event_id: EventId, items: Vec<FeedbackItem>) {
        self.feedback.write().insert(event_id, items);
    }

    /// Replace the summary of an event.
    pub fn set_summary(&self, summary: FeedbackSummary) {
        self.summaries.write().insert(summary.event_id, summary);
    }

    /// Make every request fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<FetchError>) {
        *self.failure.write() = error;
    }

    /// Number of feedback list requests served.
    #[must_use]
    pub fn feedback_fetches(&self) -> u64 {
        self.feedback_fetches.load(Ordering::SeqCst)
    }

    /// Number of summary requests served.
    #[must_use]
    pub fn summary_fetches(&self) -> u64 {
        self.summary_fetches.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), FetchError> {
        match self.failure.read().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FeedbackSource for InMemoryFeedbackSource {
    async fn feedback_for_event(&self, event_id: EventId) -> Result<Vec<FeedbackItem>, FetchError> {
        self.feedback_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.feedback.read().get(&event_id).cloned().unwrap_or_default())
    }

    async fn summary_for_event(&self, event_id: EventId) -> Result<FeedbackSummary, FetchError> {
        self.summary_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.summaries
            .read()
            .get(&event_id)
            .copied()
            .ok_or(FetchError::NotFound(event_id))
    }
}

/// Logout endpoint stand-in.
#[derive(Debug, Default)]
pub struct InMemoryAuthApi {
    failure: RwLock<Option<FetchError>>,
    logouts: AtomicU64,
}

impl InMemoryAuthApi {
    /// Create an endpoint that accepts every logout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make logout fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<FetchError>) {
        *self.failure.write() = error;
    }

    /// Number of logout calls received.
    #[must_use]
    pub fn logouts(&self) -> u64 {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for InMemoryAuthApi {
    async fn logout(&self, _credential: &Credential) -> Result<(), FetchError> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        match self.failure.read().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
