//! Fully wired client around a loopback server, with a controllable clock.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use fc_01_session::{FixedClock, InMemoryClientStorage, RecordingNavigator, SessionEvaluator};
use fc_02_realtime::{loopback, ConnectionManager, ConnectionState, LoopbackServer, RealtimeConfig};
use fc_03_views::{InMemoryAuthApi, InMemoryFeedbackSource, SessionController, ToastEvent, ToastService};
use parking_lot::Mutex;
use shared_bus::{FeedbackBus, Subscription};
use shared_types::{EventId, FeedbackId};
use std::sync::Arc;

pub const NOW: i64 = 1_750_000_000;

/// A signed-looking token expiring at `exp`.
pub fn token(exp: i64, roles: &[&str]) -> String {
    let roles: Vec<String> = roles.iter().map(|r| format!("\"{r}\"")).collect();
    let payload = format!(
        r#"{{"sub":"alice","exp":{exp},"roles":[{}]}}"#,
        roles.join(",")
    );
    format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(payload))
}

/// Broadcast body for one feedback item.
pub fn update_json(id: FeedbackId, event: EventId, sentiment: &str) -> String {
    format!(
        r#"{{"id":"{id}","eventId":"{event}","content":"Great talk","createdAt":"2025-03-01T10:00:00","sentimentType":"{sentiment}"}}"#
    )
}

pub struct Client {
    pub clock: Arc<FixedClock>,
    pub navigator: Arc<RecordingNavigator>,
    pub session: SessionEvaluator,
    pub bus: Arc<FeedbackBus>,
    pub toasts: Arc<ToastService>,
    pub toast_log: Arc<Mutex<Vec<ToastEvent>>>,
    pub connection: ConnectionManager,
    pub controller: SessionController,
    pub server: LoopbackServer,
    pub source: Arc<InMemoryFeedbackSource>,
    pub auth: Arc<InMemoryAuthApi>,
    _outlet: Subscription<ToastEvent>,
}

impl Client {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::at(NOW));
        let navigator = Arc::new(RecordingNavigator::new());
        let session = SessionEvaluator::new(
            Arc::new(InMemoryClientStorage::new()),
            clock.clone(),
            navigator.clone(),
        );
        let bus = Arc::new(FeedbackBus::new());
        let toasts = Arc::new(ToastService::new());
        let toast_log: Arc<Mutex<Vec<ToastEvent>>> = Arc::default();
        let sink = Arc::clone(&toast_log);
        let outlet = toasts.subscribe(move |event| sink.lock().push(event.clone()));

        let (connector, server) = loopback();
        let connection = ConnectionManager::new(
            RealtimeConfig::default(),
            Arc::new(connector),
            Arc::new(session.clone()),
            bus.clone(),
            toasts.clone(),
        );
        let auth = Arc::new(InMemoryAuthApi::new());
        let controller =
            SessionController::new(session.clone(), connection.clone(), auth.clone(), toasts.clone());

        Self {
            clock,
            navigator,
            session,
            bus,
            toasts,
            toast_log,
            connection,
            controller,
            server,
            source: Arc::new(InMemoryFeedbackSource::new()),
            auth,
            _outlet: outlet,
        }
    }

    pub async fn wait_for(&self, target: ConnectionState) {
        let mut rx = self.connection.watch_state();
        rx.wait_for(|state| *state == target).await.unwrap();
    }

    pub fn shown_toasts(&self) -> Vec<String> {
        self.toast_log
            .lock()
            .iter()
            .filter_map(|event| match event {
                ToastEvent::Show(toast) => Some(toast.text.clone()),
                ToastEvent::Clear => None,
            })
            .collect()
    }
}
