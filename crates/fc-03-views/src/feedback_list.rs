//! # Feedback List View
//!
//! Holds the feedback items of one event and keeps them current from pushed
//! snapshots.
//!
//! Updates that arrive while a fetch is in flight are buffered and replayed
//! on top of the fetched snapshot, so a sentiment change is not lost to a
//! response that was computed before it.

use crate::ports::{FeedbackSource, FetchError};
use crate::reconcile::reconcile_list;
use parking_lot::RwLock;
use shared_bus::{FeedbackBus, Subscription};
use shared_types::{EventId, FeedbackItem, FeedbackUpdateEvent};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Default)]
struct ListState {
    items: Vec<FeedbackItem>,
    loading: bool,
    buffered: Vec<FeedbackUpdateEvent>,
    last_error: Option<FetchError>,
}

impl ListState {
    fn apply(&mut self, update: &FeedbackUpdateEvent) {
        if self.loading {
            self.buffered.push(update.clone());
        } else if reconcile_list(&mut self.items, update) {
            debug!(feedback = %update.feedback_id, sentiment = ?update.sentiment_type, "Feedback item replaced");
        }
    }
}

/// Live list of one event's feedback.
pub struct FeedbackListView {
    event_id: EventId,
    source: Arc<dyn FeedbackSource>,
    state: Arc<RwLock<ListState>>,
    subscription: Option<Subscription<FeedbackUpdateEvent>>,
}

impl FeedbackListView {
    /// Subscribe to `bus` and load the initial snapshot.
    ///
    /// A failed initial fetch leaves the list empty; see [`Self::last_error`].
    pub async fn open(event_id: EventId, source: Arc<dyn FeedbackSource>, bus: &FeedbackBus) -> Self {
        let state = Arc::new(RwLock::new(ListState::default()));

        let sink = Arc::clone(&state);
        let subscription = bus.subscribe(move |update| sink.write().apply(update));

        let mut view = Self {
            event_id,
            source,
            state,
            subscription: Some(subscription),
        };
        if let Err(e) = view.refresh().await {
            warn!(event = %event_id, error = %e, "Failed to load feedback");
        }
        view
    }

    /// Re-fetch the full list from the server.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the current items are kept.
    pub async fn refresh(&mut self) -> Result<(), FetchError> {
        self.state.write().loading = true;
        let result = self.source.feedback_for_event(self.event_id).await;

        let mut state = self.state.write();
        state.loading = false;
        let outcome = match result {
            Ok(items) => {
                state.items = items;
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                state.last_error = Some(e.clone());
                Err(e)
            }
        };

        let buffered = std::mem::take(&mut state.buffered);
        for update in &buffered {
            state.apply(update);
        }
        debug!(event = %self.event_id, items = state.items.len(), replayed = buffered.len(), "Feedback list refreshed");

        outcome
    }

    /// Event this view shows.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Current items, in server order.
    #[must_use]
    pub fn items(&self) -> Vec<FeedbackItem> {
        self.state.read().items.clone()
    }

    /// Error of the most recent fetch, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<FetchError> {
        self.state.read().last_error.clone()
    }

    /// Whether the view still receives updates.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop receiving updates. Items stay readable.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            debug!(event = %self.event_id, "Feedback list closed");
        }
    }
}

impl std::fmt::Debug for FeedbackListView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackListView")
            .field("event_id", &self.event_id)
            .field("items", &self.state.read().items.len())
            .field("open", &self.is_open())
            .finish()
    }
}
