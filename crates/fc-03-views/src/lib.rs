//! # FC-03 Views
//!
//! Consumers of the feedback bus and the session UI glue.
//!
//! Each view subscribes to the shared [`shared_bus::FeedbackBus`] on open,
//! holds its [`shared_bus::Subscription`] for its own lifetime and reconciles
//! its local state from pushed snapshots without re-fetching, except where a
//! server-side aggregate has to be recomputed.
//!
//! - `FeedbackListView`: replace-by-id list reconciliation
//! - `FeedbackSummaryView`: refetch on matching event
//! - `ToastService`: transient user notifications, fed by session notices
//! - `SessionController`: login completion and logout sequencing

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod feedback_list;
pub mod feedback_summary;
pub mod ports;
pub mod reconcile;
pub mod session_ui;
pub mod toast;

pub use adapters::{InMemoryAuthApi, InMemoryFeedbackSource};
pub use feedback_list::FeedbackListView;
pub use feedback_summary::{FeedbackSummaryView, SummaryState};
pub use ports::{AuthApi, FeedbackSource, FetchError};
pub use reconcile::{reconcile_list, summary_needs_refresh};
pub use session_ui::SessionController;
pub use toast::{ToastEvent, ToastKind, ToastMessage, ToastService};
