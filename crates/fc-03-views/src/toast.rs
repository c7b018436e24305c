//! Transient user notifications.

use fc_02_realtime::{SessionNotice, SessionNoticeSink};
use shared_bus::{FanoutBus, Subscription};
use std::fmt;
use tracing::info;

/// Text shown when the server ends the session without a message of its own.
pub const SESSION_EXPIRED_TEXT: &str = "Your session has expired. Please log in again.";

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        })
    }
}

/// One notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub kind: ToastKind,
    pub text: String,
}

/// What the toast outlet should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastEvent {
    Show(ToastMessage),
    /// Dismiss everything currently shown.
    Clear,
}

/// Publishes toasts to whatever renders them.
#[derive(Default)]
pub struct ToastService {
    bus: FanoutBus<ToastEvent>,
}

impl ToastService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a toast outlet.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, outlet: F) -> Subscription<ToastEvent>
    where
        F: Fn(&ToastEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(outlet)
    }

    pub fn show(&self, toast: ToastMessage) {
        info!(kind = %toast.kind, text = %toast.text, "Toast");
        self.bus.publish(&ToastEvent::Show(toast));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(ToastMessage {
            kind: ToastKind::Success,
            text: text.into(),
        });
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(ToastMessage {
            kind: ToastKind::Info,
            text: text.into(),
        });
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(ToastMessage {
            kind: ToastKind::Error,
            text: text.into(),
        });
    }

    pub fn clear(&self) {
        self.bus.publish(&ToastEvent::Clear);
    }
}

impl SessionNoticeSink for ToastService {
    fn session_expired(&self, notice: &SessionNotice) {
        self.info(notice.message.as_deref().unwrap_or(SESSION_EXPIRED_TEXT));
    }
}

impl fmt::Debug for ToastService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastService")
            .field("outlets", &self.bus.subscriber_count())
            .finish()
    }
}
