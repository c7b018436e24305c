//! # Event Publisher
//!
//! Defines the publishing side of the fan-out bus.

use crate::subscriber::{DeliveryGate, SubscriberId, Subscription};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Subscriber callback invoked for every published event.
pub(crate) type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A registered subscriber.
pub(crate) struct SubscriberEntry<E> {
    pub(crate) id: SubscriberId,
    pub(crate) callback: Callback<E>,
    /// Closed by the subscription handle before the entry is removed.
    pub(crate) gate: Arc<DeliveryGate>,
}

impl<E> Clone for SubscriberEntry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
            gate: Arc::clone(&self.gate),
        }
    }
}

/// State shared between the bus and its subscription handles.
pub(crate) struct BusShared<E> {
    /// Subscribers in registration order.
    subscribers: RwLock<Vec<SubscriberEntry<E>>>,

    /// Next subscriber identifier.
    next_id: AtomicU64,
}

impl<E> BusShared<E> {
    /// Remove a subscriber. Returns whether it was still registered.
    pub(crate) fn remove(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|entry| entry.id != id);
        before != subscribers.len()
    }
}

/// Synchronous multicast publish point.
///
/// Every subscriber receives every event; relevance filtering is the
/// subscriber's job. Share it behind an `Arc` between the publisher and the
/// views.
pub struct FanoutBus<E> {
    shared: Arc<BusShared<E>>,

    /// Total events published.
    events_published: AtomicU64,
}

impl<E> FanoutBus<E> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(BusShared {
                subscribers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
            events_published: AtomicU64::new(0),
        }
    }

    /// Register a callback for all future events.
    ///
    /// The returned handle must be kept for as long as the consumer lives;
    /// dropping it or calling [`Subscription::unsubscribe`] releases the
    /// registration.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription<E>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let gate = Arc::new(DeliveryGate::new());

        self.shared.subscribers.write().push(SubscriberEntry {
            id,
            callback: Arc::new(callback),
            gate: Arc::clone(&gate),
        });

        debug!(subscriber = %id, "New subscription created");

        Subscription::new(id, Arc::downgrade(&self.shared), gate)
    }

    /// Deliver an event to every currently active subscriber.
    ///
    /// Runs the callbacks on the calling task, in subscription order. The
    /// subscriber list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe without deadlocking.
    ///
    /// # Returns
    ///
    /// The number of subscribers that were invoked.
    pub fn publish(&self, event: &E) -> usize {
        let snapshot: Vec<SubscriberEntry<E>> = self.shared.subscribers.read().clone();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let mut delivered = 0;
        for entry in &snapshot {
            // Skips entries removed after the snapshot was taken
            if entry.gate.run(|| (entry.callback)(event)) {
                delivered += 1;
            }
        }

        trace!(
            subscribers = snapshot.len(),
            delivered = delivered,
            "Event published"
        );
        delivered
    }

    /// Get the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.read().len()
    }

    /// Get the total number of events published.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl<E> Default for FanoutBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
