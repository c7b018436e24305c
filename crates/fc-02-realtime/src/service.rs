//! # Connection Manager
//!
//! Owns the single realtime channel of the client.
//!
//! The manager is a cheap cloneable handle. All state lives behind one lock;
//! the channel loop and the reconnect timer are spawned tasks that capture the
//! epoch they were started for and give up as soon as it is no longer current.

use crate::domain::{parse_feedback_update, parse_session_notice, ConnectionState, RealtimeConfig};
use crate::error::TransportError;
use crate::ports::{
    ChannelConnector, HandshakeRequest, InboundMessage, RealtimeChannel, SessionGate,
    SessionNoticeSink, SubscriptionSpec,
};
use fc_01_session::Credential;
use parking_lot::Mutex;
use shared_bus::FeedbackBus;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Subscription id of the feedback broadcast.
pub const FEEDBACK_SUBSCRIPTION_ID: &str = "sub-feedback-updates";

/// Subscription id of the private session queue.
pub const SESSION_SUBSCRIPTION_ID: &str = "sub-session";

/// Mutable manager state, guarded by a single lock.
struct ManagerState {
    connection: ConnectionState,
    /// Incremented on every `connect` and `disconnect`. Async completions
    /// carrying an older epoch are discarded.
    epoch: u64,
    /// Asks the live channel task to close gracefully.
    close: Option<oneshot::Sender<()>>,
    /// Pending automatic reconnect.
    reconnect: Option<JoinHandle<()>>,
}

struct Inner {
    config: RealtimeConfig,
    connector: Arc<dyn ChannelConnector>,
    session: Arc<dyn SessionGate>,
    bus: Arc<FeedbackBus>,
    notices: Arc<dyn SessionNoticeSink>,
    state: Mutex<ManagerState>,
    state_tx: watch::Sender<ConnectionState>,
}

/// What ended one wait of the channel loop.
enum ChannelEvent {
    CloseRequested,
    Message(Option<Result<InboundMessage, TransportError>>),
}

/// Maintains at most one live channel and dispatches what it receives.
///
/// Construct one per application and inject it where needed.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    /// Create a disconnected manager.
    pub fn new(
        config: RealtimeConfig,
        connector: Arc<dyn ChannelConnector>,
        session: Arc<dyn SessionGate>,
        bus: Arc<FeedbackBus>,
        notices: Arc<dyn SessionNoticeSink>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                config,
                connector,
                session,
                bus,
                notices,
                state: Mutex::new(ManagerState {
                    connection: ConnectionState::Disconnected,
                    epoch: 0,
                    close: None,
                    reconnect: None,
                }),
                state_tx,
            }),
        }
    }

    /// Start opening the channel.
    ///
    /// No-op unless the manager is `Disconnected` and the session is
    /// authenticated. A second call while `Connecting` or `Connected` is not
    /// an error.
    ///
    /// # Returns
    ///
    /// `true` if a handshake was started.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) -> bool {
        let mut state = self.inner.state.lock();
        self.inner.start_locked(&mut state)
    }

    /// Tear down the channel and cancel any pending retry.
    ///
    /// Idempotent. An in-flight handshake is abandoned; if the server
    /// acknowledges it later, the acknowledgement is ignored.
    pub fn disconnect(&self) {
        let mut state = self.inner.state.lock();
        state.epoch += 1;

        if let Some(timer) = state.reconnect.take() {
            timer.abort();
        }
        if let Some(close) = state.close.take() {
            let _ = close.send(());
        }

        if state.connection.is_active() {
            info!(from = %state.connection, epoch = state.epoch, "Realtime channel disconnected");
        }
        self.inner.set_state(&mut state, ConnectionState::Disconnected);
    }

    /// Application-end disposal.
    pub fn shutdown(&self) {
        self.disconnect();
    }

    /// Whether the channel is strictly `Connected`.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().connection
    }

    /// Observe state transitions.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Whether an automatic reconnect is scheduled.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.inner.state.lock().reconnect.is_some()
    }

    /// Bus the manager publishes feedback updates on.
    #[must_use]
    pub fn bus(&self) -> &Arc<FeedbackBus> {
        &self.inner.bus
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RealtimeConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("url", &self.inner.config.url)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn set_state(&self, state: &mut ManagerState, next: ConnectionState) {
        if state.connection != next {
            trace!(from = %state.connection, to = %next, "Connection state change");
        }
        state.connection = next;
        self.state_tx.send_replace(next);
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.state.lock().epoch == epoch
    }

    /// Begin a handshake. Caller holds the state lock.
    fn start_locked(self: &Arc<Self>, state: &mut ManagerState) -> bool {
        if state.connection != ConnectionState::Disconnected {
            debug!(state = %state.connection, "connect() ignored, channel already active");
            return false;
        }

        let Some(credential) = self.session.credential() else {
            debug!("connect() ignored, session not authenticated");
            return false;
        };

        if let Some(timer) = state.reconnect.take() {
            timer.abort();
        }

        state.epoch += 1;
        let epoch = state.epoch;
        let (close_tx, close_rx) = oneshot::channel();
        state.close = Some(close_tx);
        self.set_state(state, ConnectionState::Connecting);

        info!(url = %self.config.url, epoch = epoch, "Opening realtime channel");
        tokio::spawn(Arc::clone(self).run_channel(epoch, credential, close_rx));
        true
    }

    async fn run_channel(
        self: Arc<Self>,
        epoch: u64,
        credential: Credential,
        mut close_rx: oneshot::Receiver<()>,
    ) {
        let request = HandshakeRequest {
            url: self.config.url.clone(),
            credential,
        };

        let opened = tokio::select! {
            _ = &mut close_rx => {
                debug!(epoch = epoch, "Handshake abandoned");
                return;
            }
            result = self.connector.open(request) => result,
        };

        let mut channel = match opened {
            Ok(channel) => channel,
            Err(e) => {
                warn!(url = %self.config.url, error = %e, "Realtime handshake failed");
                self.handle_drop(epoch);
                return;
            }
        };

        if !self.is_current(epoch) {
            debug!(epoch = epoch, "Late handshake acknowledgement discarded");
            channel.close().await;
            return;
        }

        if let Err(e) = self.establish_subscriptions(channel.as_mut()).await {
            warn!(error = %e, "Failed to subscribe on realtime channel");
            channel.close().await;
            self.handle_drop(epoch);
            return;
        }

        if !self.mark_connected(epoch) {
            channel.close().await;
            return;
        }

        loop {
            let event = tokio::select! {
                _ = &mut close_rx => ChannelEvent::CloseRequested,
                message = channel.next_message() => ChannelEvent::Message(message),
            };

            match event {
                ChannelEvent::CloseRequested => {
                    channel.close().await;
                    debug!(epoch = epoch, "Realtime channel closed on request");
                    return;
                }
                ChannelEvent::Message(Some(Ok(message))) => {
                    if !self.is_current(epoch) {
                        channel.close().await;
                        return;
                    }
                    self.dispatch(message);
                }
                ChannelEvent::Message(Some(Err(e))) => {
                    warn!(error = %e, "Realtime channel failed");
                    break;
                }
                ChannelEvent::Message(None) => {
                    info!(epoch = epoch, "Realtime channel closed by server");
                    break;
                }
            }
        }

        channel.close().await;
        self.handle_drop(epoch);
    }

    async fn establish_subscriptions(
        &self,
        channel: &mut dyn RealtimeChannel,
    ) -> Result<(), TransportError> {
        let specs = [
            SubscriptionSpec::new(FEEDBACK_SUBSCRIPTION_ID, self.config.feedback_topic.as_str()),
            SubscriptionSpec::new(SESSION_SUBSCRIPTION_ID, self.config.session_queue.as_str()),
        ];
        for spec in &specs {
            channel.subscribe(spec).await?;
            debug!(destination = %spec.destination, "Subscribed");
        }
        Ok(())
    }

    fn mark_connected(&self, epoch: u64) -> bool {
        let mut state = self.state.lock();
        if state.epoch != epoch || state.connection != ConnectionState::Connecting {
            return false;
        }
        self.set_state(&mut state, ConnectionState::Connected);
        info!(url = %self.config.url, epoch = epoch, "Realtime channel connected");
        true
    }

    /// Unexpected end of the channel or failed handshake.
    fn handle_drop(self: &Arc<Self>, epoch: u64) {
        let mut state = self.state.lock();
        if state.epoch != epoch {
            return;
        }
        state.close = None;
        self.set_state(&mut state, ConnectionState::Disconnected);

        let delay = self.config.reconnect_delay;
        info!(delay_secs = delay.as_secs_f64(), "Scheduling realtime reconnect");

        let inner = Arc::clone(self);
        state.reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.retry(epoch);
        }));
    }

    fn retry(self: &Arc<Self>, epoch: u64) {
        let mut state = self.state.lock();
        if state.epoch != epoch || state.connection != ConnectionState::Disconnected {
            return;
        }
        state.reconnect = None;

        if !self.session.is_authenticated() {
            info!("Session no longer authenticated, not reconnecting");
            return;
        }
        self.start_locked(&mut state);
    }

    fn dispatch(&self, message: InboundMessage) {
        if message.subscription == FEEDBACK_SUBSCRIPTION_ID
            || message.destination == self.config.feedback_topic
        {
            match parse_feedback_update(&message.body) {
                Ok(update) => {
                    let delivered = self.bus.publish(&update);
                    trace!(feedback = %update.feedback_id, delivered = delivered, "Feedback update published");
                }
                Err(e) => warn!(error = %e, "Dropping malformed feedback update"),
            }
        } else if message.subscription == SESSION_SUBSCRIPTION_ID
            || message.destination == self.config.session_queue
        {
            match parse_session_notice(&message.body) {
                Ok(Some(notice)) => {
                    info!("Server reported session expiry");
                    self.notices.session_expired(&notice);
                }
                Ok(None) => debug!("Ignoring session queue message of another type"),
                Err(e) => debug!(error = %e, "Ignoring unparseable session queue message"),
            }
        } else {
            debug!(destination = %message.destination, "Message for unknown destination");
        }
    }
}
