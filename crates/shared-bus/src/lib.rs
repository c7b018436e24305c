//! # Shared Bus - Update Fan-out Bus
//!
//! In-process publish point fed by the realtime connection manager and read by
//! any number of independent consumer views.
//!
//! ## Delivery Rules
//!
//! - Delivery is synchronous, on the publishing task, in subscription order.
//! - Subscribers added during a publish do not see that in-flight event.
//! - A subscriber removed during a publish is never invoked after its removal
//!   has completed.
//! - There is no replay buffer: a late subscriber must fetch a snapshot itself
//!   and use the bus only for incremental catch-up.
//!
//! ```text
//! ┌──────────────────┐   publish()   ┌──────────────┐   callback   ┌───────────────┐
//! │ Connection Mgr   │ ────────────→ │  FanoutBus   │ ───────────→ │ List view     │
//! └──────────────────┘               │              │ ───────────→ │ Summary view  │
//!                                    └──────────────┘ ───────────→ │ ...           │
//!                                                                  └───────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod publisher;
pub mod subscriber;

use shared_types::FeedbackUpdateEvent;

// Re-export main types
pub use publisher::FanoutBus;
pub use subscriber::{SubscriberId, Subscription};

/// The bus carrying feedback updates from the realtime channel to views.
pub type FeedbackBus = FanoutBus<FeedbackUpdateEvent>;
