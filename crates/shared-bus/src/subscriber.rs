//! # Event Subscriber
//!
//! Defines the subscription side of the fan-out bus.

use crate::publisher::BusShared;
use parking_lot::ReentrantMutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Identifier of one registration on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Delivery gate shared by a registration and its handle.
///
/// The publisher holds `running` across the liveness check and the callback,
/// so closing the gate from another thread waits for an invocation in
/// progress. The lock is reentrant: a callback may close its own gate.
///
/// Two callbacks running on different threads must not close each other's
/// gates.
pub(crate) struct DeliveryGate {
    active: AtomicBool,
    running: ReentrantMutex<()>,
}

impl DeliveryGate {
    pub(crate) fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            running: ReentrantMutex::new(()),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Run `deliver` if the gate is still open. Returns whether it ran.
    pub(crate) fn run<F: FnOnce()>(&self, deliver: F) -> bool {
        let _running = self.running.lock();
        if !self.is_open() {
            return false;
        }
        deliver();
        true
    }

    /// Close the gate once no other thread is delivering through it.
    ///
    /// Returns whether this call closed it.
    pub(crate) fn close(&self) -> bool {
        let _running = self.running.lock();
        self.active.swap(false, Ordering::AcqRel)
    }
}

/// Unsubscribe handle returned by [`crate::FanoutBus::subscribe`].
///
/// When dropped, the subscription is automatically cleaned up. A view keeps
/// this for its own lifetime so a destroyed view never receives events.
pub struct Subscription<E> {
    /// Registration being held.
    id: SubscriberId,

    /// Reference to the bus registry (for cleanup).
    bus: Weak<BusShared<E>>,

    /// Delivery gate checked by the publisher around each invocation.
    gate: Arc<DeliveryGate>,
}

impl<E> Subscription<E> {
    /// Create a new subscription handle.
    pub(crate) fn new(id: SubscriberId, bus: Weak<BusShared<E>>, gate: Arc<DeliveryGate>) -> Self {
        Self { id, bus, gate }
    }

    /// Get the identifier of this registration.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Whether the registration is still live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gate.is_open()
    }

    /// Release the registration.
    ///
    /// Once this returns the callback is never invoked again. A publish in
    /// progress on this task skips it; one in progress on another thread is
    /// waited for if it is inside the callback right now.
    pub fn unsubscribe(self) {
        // Cleanup happens in Drop
    }

    fn release(&mut self) {
        if !self.gate.close() {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
        }
        debug!(subscriber = %self.id, "Subscription dropped");
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::FeedbackBus;
    use chrono::NaiveDate;
    use shared_types::{FeedbackId, FeedbackUpdateEvent, SentimentType};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    fn update() -> FeedbackUpdateEvent {
        FeedbackUpdateEvent {
            feedback_id: FeedbackId::new_v4(),
            event_id: None,
            content: "nice".to_string(),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            sentiment_type: SentimentType::Neutral,
        }
    }

    #[test]
    fn test_subscription_drop_cleanup() {
        let bus = FeedbackBus::new();

        {
            let _sub1 = bus.subscribe(|_| {});
            let _sub2 = bus.subscribe(|_| {});
            assert_eq!(bus.subscriber_count(), 2);
        }

        // After drop, count should be 0
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = FeedbackBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(sub.is_active());

        bus.publish(&update());
        sub.unsubscribe();
        bus.publish(&update());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = FeedbackBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);

        // Releasing after the bus is gone is a no-op
        sub.unsubscribe();
    }

    #[test]
    fn test_subscriber_ids_are_unique() {
        let bus = FeedbackBus::new();
        let a = bus.subscribe(|_| {});
        let b = bus.subscribe(|_| {});
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_unsubscribe_waits_for_delivery_on_another_thread() {
        let bus = Arc::new(FeedbackBus::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let (entered_tx, entered_rx) = mpsc::channel();
        let entered_tx = parking_lot::Mutex::new(entered_tx);

        let (counter, done) = (Arc::clone(&calls), Arc::clone(&finished));
        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = entered_tx.lock().send(());
            thread::sleep(Duration::from_millis(50));
            done.store(true, Ordering::SeqCst);
        });

        let publisher = {
            let bus = Arc::clone(&bus);
            thread::spawn(move || bus.publish(&update()))
        };

        entered_rx.recv().unwrap();
        sub.unsubscribe();
        assert!(finished.load(Ordering::SeqCst));

        assert_eq!(publisher.join().unwrap(), 1);
        assert_eq!(bus.publish(&update()), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
