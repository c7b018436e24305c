//! # Feedback Summary View
//!
//! Shows the sentiment distribution of one event. The distribution is a
//! server-side aggregate, so a pushed update cannot be folded in locally: each
//! update for this event triggers one full re-fetch and its payload is
//! discarded.
//!
//! Bus callbacks must not block, so fetches run on a worker task fed through a
//! channel. Requests are processed one at a time in arrival order.

use crate::ports::{FeedbackSource, FetchError};
use crate::reconcile::summary_needs_refresh;
use shared_bus::{FeedbackBus, Subscription};
use shared_types::{EventId, FeedbackSummary, FeedbackUpdateEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Snapshot of the view's state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryState {
    /// Last successfully fetched summary.
    pub summary: Option<FeedbackSummary>,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Error of the most recent fetch, if it failed.
    pub last_error: Option<FetchError>,
    /// Completed fetches, successful or not.
    pub fetch_count: u64,
}

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy)]
enum RefreshReason {
    Initial,
    Manual,
    Update,
}

/// Live sentiment summary of one event.
pub struct FeedbackSummaryView {
    event_id: EventId,
    state: watch::Receiver<SummaryState>,
    refresh_tx: mpsc::UnboundedSender<RefreshReason>,
    subscription: Option<Subscription<FeedbackUpdateEvent>>,
    worker: JoinHandle<()>,
}

impl FeedbackSummaryView {
    /// Subscribe to `bus`, start the refresh worker and request the initial fetch.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(event_id: EventId, source: Arc<dyn FeedbackSource>, bus: &FeedbackBus) -> Self {
        let (state_tx, state) = watch::channel(SummaryState::default());
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        let _ = refresh_tx.send(RefreshReason::Initial);
        let worker = tokio::spawn(run_worker(event_id, source, state_tx, refresh_rx));

        let updates_tx = refresh_tx.clone();
        let subscription = bus.subscribe(move |update: &FeedbackUpdateEvent| {
            if summary_needs_refresh(event_id, update) {
                let _ = updates_tx.send(RefreshReason::Update);
            }
        });

        Self {
            event_id,
            state,
            refresh_tx,
            subscription: Some(subscription),
            worker,
        }
    }

    /// Request a re-fetch.
    ///
    /// Returns `false` once the view is closed.
    pub fn refresh(&self) -> bool {
        self.is_open() && self.refresh_tx.send(RefreshReason::Manual).is_ok()
    }

    /// Event this view shows.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Last successfully fetched summary.
    #[must_use]
    pub fn summary(&self) -> Option<FeedbackSummary> {
        self.state.borrow().summary
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Error of the most recent fetch, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<FetchError> {
        self.state.borrow().last_error.clone()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SummaryState {
        self.state.borrow().clone()
    }

    /// Observe state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SummaryState> {
        self.state.clone()
    }

    /// Whether the view still receives updates.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop receiving updates and stop the worker. The last state stays readable.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            self.worker.abort();
            debug!(event = %self.event_id, "Feedback summary closed");
        }
    }
}

impl Drop for FeedbackSummaryView {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

impl std::fmt::Debug for FeedbackSummaryView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackSummaryView")
            .field("event_id", &self.event_id)
            .field("state", &*self.state.borrow())
            .field("open", &self.is_open())
            .finish()
    }
}

async fn run_worker(
    event_id: EventId,
    source: Arc<dyn FeedbackSource>,
    state: watch::Sender<SummaryState>,
    mut requests: mpsc::UnboundedReceiver<RefreshReason>,
) {
    while let Some(reason) = requests.recv().await {
        state.send_modify(|s| s.loading = true);
        let result = source.summary_for_event(event_id).await;

        state.send_modify(|s| {
            s.loading = false;
            s.fetch_count += 1;
            match result {
                Ok(summary) => {
                    s.summary = Some(summary);
                    s.last_error = None;
                }
                Err(e) => {
                    warn!(event = %event_id, reason = ?reason, error = %e, "Failed to load feedback summary");
                    s.last_error = Some(e);
                }
            }
        });
        debug!(event = %event_id, reason = ?reason, "Feedback summary refreshed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryFeedbackSource;
    use chrono::NaiveDate;
    use shared_types::{FeedbackId, SentimentType};

    fn summary(event_id: EventId, positive: u64) -> FeedbackSummary {
        FeedbackSummary {
            event_id,
            total_feedback_count: positive + 1,
            positive_count: positive,
            neutral_count: 0,
            negative_count: 0,
        }
    }

    fn update(event_id: Option<EventId>) -> FeedbackUpdateEvent {
        FeedbackUpdateEvent {
            feedback_id: FeedbackId::new_v4(),
            event_id,
            content: "Loved it".to_string(),
            created_at: NaiveDate::from_ymd_opt(2025, 5, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            sentiment_type: SentimentType::Positive,
        }
    }

    async fn wait_for_fetches(view: &FeedbackSummaryView, count: u64) -> SummaryState {
        let mut rx = view.watch();
        let state = rx
            .wait_for(|s| s.fetch_count >= count && !s.loading)
            .await
            .unwrap()
            .clone();
        state
    }

    #[tokio::test]
    async fn test_initial_fetch() {
        let event = EventId::new_v4();
        let source = Arc::new(InMemoryFeedbackSource::new());
        source.set_summary(summary(event, 3));
        let bus = FeedbackBus::new();

        let view = FeedbackSummaryView::open(event, source.clone(), &bus);
        let state = wait_for_fetches(&view, 1).await;

        assert_eq!(state.summary, Some(summary(event, 3)));
        assert!(!view.is_loading());
        assert_eq!(source.summary_fetches(), 1);
    }

    #[tokio::test]
    async fn test_matching_update_triggers_exactly_one_refetch() {
        let event = EventId::new_v4();
        let source = Arc::new(InMemoryFeedbackSource::new());
        source.set_summary(summary(event, 1));
        let bus = FeedbackBus::new();
        let view = FeedbackSummaryView::open(event, source.clone(), &bus);
        wait_for_fetches(&view, 1).await;

        source.set_summary(summary(event, 2));
        bus.publish(&update(Some(event)));
        let state = wait_for_fetches(&view, 2).await;

        assert_eq!(state.summary, Some(summary(event, 2)));
        tokio::task::yield_now().await;
        assert_eq!(source.summary_fetches(), 2);
    }

    #[tokio::test]
    async fn test_other_events_do_not_refetch() {
        let event = EventId::new_v4();
        let source = Arc::new(InMemoryFeedbackSource::new());
        source.set_summary(summary(event, 1));
        let bus = FeedbackBus::new();
        let view = FeedbackSummaryView::open(event, source.clone(), &bus);
        wait_for_fetches(&view, 1).await;

        bus.publish(&update(Some(EventId::new_v4())));
        bus.publish(&update(None));
        assert!(view.refresh());
        wait_for_fetches(&view, 2).await;

        // Only the manual refresh reached the source
        assert_eq!(source.summary_fetches(), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_previous_summary() {
        let event = EventId::new_v4();
        let source = Arc::new(InMemoryFeedbackSource::new());
        source.set_summary(summary(event, 4));
        let bus = FeedbackBus::new();
        let view = FeedbackSummaryView::open(event, source.clone(), &bus);
        wait_for_fetches(&view, 1).await;

        source.set_failure(Some(FetchError::Request("503".to_string())));
        bus.publish(&update(Some(event)));
        let state = wait_for_fetches(&view, 2).await;

        assert_eq!(state.summary, Some(summary(event, 4)));
        assert_eq!(state.last_error, Some(FetchError::Request("503".to_string())));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_closed_view_stops_refreshing() {
        let event = EventId::new_v4();
        let source = Arc::new(InMemoryFeedbackSource::new());
        source.set_summary(summary(event, 1));
        let bus = FeedbackBus::new();
        let mut view = FeedbackSummaryView::open(event, source.clone(), &bus);
        wait_for_fetches(&view, 1).await;

        view.close();
        bus.publish(&update(Some(event)));
        assert!(!view.refresh());
        tokio::task::yield_now().await;

        assert_eq!(source.summary_fetches(), 1);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(view.summary(), Some(summary(event, 1)));
    }
}
