//! Reconciliation rules applied to pushed feedback snapshots.

use shared_types::{EventId, FeedbackItem, FeedbackUpdateEvent};

/// Replace the item whose id matches `update`, in place.
///
/// Unknown ids are ignored: pushed snapshots never insert. Returns whether an
/// item was replaced.
pub fn reconcile_list(items: &mut [FeedbackItem], update: &FeedbackUpdateEvent) -> bool {
    match items.iter_mut().find(|item| item.feedback_id == update.feedback_id) {
        Some(item) => {
            *item = update.clone();
            true
        }
        None => false,
    }
}

/// Whether `update` invalidates the summary of `event_id`.
#[must_use]
pub fn summary_needs_refresh(event_id: EventId, update: &FeedbackUpdateEvent) -> bool {
    update.concerns(event_id)
}
