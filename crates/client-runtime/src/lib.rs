//! # Event Feedback Client Runtime
//!
//! Headless host for the client core. It wires the session, realtime and view
//! crates together and keeps the realtime channel alive while a valid
//! credential is present.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Install the logging subscriber
//! 3. Build storage, clock, transport, bus and toast outlet
//! 4. Log in with `FC_TOKEN` if given, otherwise resume a persisted session
//! 5. Run until Ctrl+C, then close the channel
//!
//! ```text
//! FileClientStorage ─→ SessionEvaluator ─→ ConnectionManager ─→ FeedbackBus ─→ views
//!                            │                    │
//!                            └── SessionController┘── ToastService ─→ log outlet
//! ```

pub mod auth;
pub mod config;
pub mod navigator;

pub use auth::LocalOnlyAuthApi;
pub use config::{load_config, load_config_from, ClientConfig, DEFAULT_DATA_DIR};
pub use navigator::LoggingNavigator;

use fc_01_session::{ClientStorage, Clock, FileClientStorage, RouteGuard, SessionEvaluator, SystemClock};
use fc_02_realtime::{ChannelConnector, ConnectionManager, StompWsConnector};
use fc_03_views::{AuthApi, SessionController, ToastEvent, ToastService};
use shared_bus::{FeedbackBus, Subscription};
use shared_types::FeedbackUpdateEvent;
use std::sync::Arc;
use tracing::info;

/// The wired client.
pub struct ClientRuntime {
    config: ClientConfig,
    navigator: Arc<LoggingNavigator>,
    session: SessionEvaluator,
    bus: Arc<FeedbackBus>,
    toasts: Arc<ToastService>,
    connection: ConnectionManager,
    controller: SessionController,
    _update_log: Subscription<FeedbackUpdateEvent>,
    _toast_log: Subscription<ToastEvent>,
}

impl ClientRuntime {
    /// Build the runtime with file storage, the system clock and the STOMP
    /// WebSocket transport.
    ///
    /// Logout is local only ([`LocalOnlyAuthApi`]): no server logout request
    /// is made. Use [`Self::with_parts`] to supply a real endpoint.
    pub fn new(config: ClientConfig) -> Self {
        let storage = Arc::new(FileClientStorage::in_dir(&config.data_dir));
        let connector = Arc::new(StompWsConnector::from_config(&config.realtime));
        Self::with_parts(
            config,
            storage,
            Arc::new(SystemClock),
            connector,
            Arc::new(LocalOnlyAuthApi),
        )
    }

    /// Build the runtime around the given storage, clock, transport and
    /// logout endpoint.
    pub fn with_parts(
        config: ClientConfig,
        storage: Arc<dyn ClientStorage>,
        clock: Arc<dyn Clock>,
        connector: Arc<dyn ChannelConnector>,
        auth: Arc<dyn AuthApi>,
    ) -> Self {
        let navigator = Arc::new(LoggingNavigator::new());
        let session = SessionEvaluator::new(storage, clock, navigator.clone());
        let bus = Arc::new(FeedbackBus::new());
        let toasts = Arc::new(ToastService::new());

        let connection = ConnectionManager::new(
            config.realtime.clone(),
            connector,
            Arc::new(session.clone()),
            Arc::clone(&bus),
            toasts.clone(),
        );
        let controller = SessionController::new(
            session.clone(),
            connection.clone(),
            auth,
            toasts.clone(),
        );

        let update_log = bus.subscribe(|update: &FeedbackUpdateEvent| {
            info!(
                feedback = %update.feedback_id,
                event = ?update.event_id,
                sentiment = ?update.sentiment_type,
                "Feedback update"
            );
        });
        let toast_log = toasts.subscribe(|event: &ToastEvent| {
            if let ToastEvent::Show(toast) = event {
                info!(kind = %toast.kind, "{}", toast.text);
            }
        });

        Self {
            config,
            navigator,
            session,
            bus,
            toasts,
            connection,
            controller,
            _update_log: update_log,
            _toast_log: toast_log,
        }
    }

    /// Log in with the configured token, or resume a persisted session.
    ///
    /// Returns whether a connection attempt was started. Without a usable
    /// credential the client is sent to the login page and stays disconnected.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        info!(url = %self.config.realtime.url, data_dir = ?self.config.data_dir, "Starting feedback client");

        if let Some(token) = &self.config.token {
            self.controller.complete_login(token.clone());
            return self.connection.state().is_active();
        }

        if RouteGuard::RequireAuthenticated.enforce(&self.session) {
            info!("Resuming persisted session");
            self.connection.connect()
        } else {
            info!("No valid credential, waiting for login");
            false
        }
    }

    /// Close the realtime channel and cancel any pending reconnect.
    pub fn shutdown(&self) {
        info!("Initiating shutdown");
        self.connection.shutdown();
        info!("Shutdown complete");
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn navigator(&self) -> &LoggingNavigator {
        &self.navigator
    }

    #[must_use]
    pub fn session(&self) -> &SessionEvaluator {
        &self.session
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<FeedbackBus> {
        &self.bus
    }

    #[must_use]
    pub fn toasts(&self) -> &Arc<ToastService> {
        &self.toasts
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    #[must_use]
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }
}
