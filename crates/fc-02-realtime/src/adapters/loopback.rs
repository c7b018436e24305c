//! # Loopback Transport
//!
//! In-process stand-in for the feedback server. The connector half is handed
//! to a [`crate::ConnectionManager`]; the server half lets a test or demo
//! accept handshakes, push messages and drop connections.

use crate::error::TransportError;
use crate::ports::{ChannelConnector, HandshakeRequest, InboundMessage, RealtimeChannel, SubscriptionSpec};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Notify};
use tracing::debug;

/// How the loopback server answers handshakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakePolicy {
    /// Acknowledge immediately.
    #[default]
    Accept,
    /// Fail immediately, as if the server were unreachable.
    Refuse,
    /// Hold until [`LoopbackServer::accept_next`] or
    /// [`LoopbackServer::reject_next`].
    Manual,
}

type Delivery = Result<InboundMessage, TransportError>;

struct PendingHandshake {
    reply: oneshot::Sender<Result<(), String>>,
}

struct Connection {
    subscriptions: Vec<SubscriptionSpec>,
    inbound: mpsc::UnboundedSender<Delivery>,
}

#[derive(Default)]
struct LoopbackState {
    policy: HandshakePolicy,
    handshakes: Vec<HandshakeRequest>,
    pending: VecDeque<PendingHandshake>,
    connections: BTreeMap<u64, Connection>,
    next_connection: u64,
    next_message_id: u64,
}

#[derive(Default)]
struct LoopbackShared {
    state: Mutex<LoopbackState>,
    changed: Notify,
}

impl LoopbackShared {
    fn register(self: &Arc<Self>) -> LoopbackChannel {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        let id = state.next_connection;
        state.next_connection += 1;
        state.connections.insert(
            id,
            Connection {
                subscriptions: Vec::new(),
                inbound: tx,
            },
        );
        drop(state);

        debug!(connection = id, "Loopback connection opened");
        self.changed.notify_waiters();
        LoopbackChannel {
            id,
            inbound: rx,
            shared: Arc::clone(self),
        }
    }
}

/// Create a connected connector/server pair.
#[must_use]
pub fn loopback() -> (LoopbackConnector, LoopbackServer) {
    let shared = Arc::new(LoopbackShared::default());
    (
        LoopbackConnector {
            shared: Arc::clone(&shared),
        },
        LoopbackServer { shared },
    )
}

/// Client half of the loopback transport.
#[derive(Clone)]
pub struct LoopbackConnector {
    shared: Arc<LoopbackShared>,
}

#[async_trait]
impl ChannelConnector for LoopbackConnector {
    async fn open(
        &self,
        request: HandshakeRequest,
    ) -> Result<Box<dyn RealtimeChannel>, TransportError> {
        let url = request.url.clone();
        let reply = {
            let mut state = self.shared.state.lock();
            state.handshakes.push(request);
            let policy = state.policy;
            match policy {
                HandshakePolicy::Accept => None,
                HandshakePolicy::Refuse => {
                    drop(state);
                    self.shared.changed.notify_waiters();
                    return Err(TransportError::Connect {
                        url,
                        reason: "connection refused".to_string(),
                    });
                }
                HandshakePolicy::Manual => {
                    let (tx, rx) = oneshot::channel();
                    state.pending.push_back(PendingHandshake { reply: tx });
                    Some(rx)
                }
            }
        };
        self.shared.changed.notify_waiters();

        if let Some(reply) = reply {
            match reply.await {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => return Err(TransportError::Rejected(reason)),
                Err(_) => return Err(TransportError::Closed),
            }
        }

        Ok(Box::new(self.shared.register()))
    }
}

/// One accepted loopback connection.
struct LoopbackChannel {
    id: u64,
    inbound: mpsc::UnboundedReceiver<Delivery>,
    shared: Arc<LoopbackShared>,
}

#[async_trait]
impl RealtimeChannel for LoopbackChannel {
    async fn subscribe(&mut self, spec: &SubscriptionSpec) -> Result<(), TransportError> {
        let mut state = self.shared.state.lock();
        let connection = state
            .connections
            .get_mut(&self.id)
            .ok_or(TransportError::Closed)?;
        connection.subscriptions.push(spec.clone());
        drop(state);
        self.shared.changed.notify_waiters();
        Ok(())
    }

    async fn next_message(&mut self) -> Option<Result<InboundMessage, TransportError>> {
        self.inbound.recv().await
    }

    async fn close(&mut self) {
        let removed = self.shared.state.lock().connections.remove(&self.id);
        if removed.is_some() {
            debug!(connection = self.id, "Loopback connection closed by client");
            self.shared.changed.notify_waiters();
        }
    }
}

impl Drop for LoopbackChannel {
    fn drop(&mut self) {
        if self.shared.state.lock().connections.remove(&self.id).is_some() {
            self.shared.changed.notify_waiters();
        }
    }
}

/// Server half of the loopback transport.
#[derive(Clone)]
pub struct LoopbackServer {
    shared: Arc<LoopbackShared>,
}

impl LoopbackServer {
    /// Change how future handshakes are answered.
    pub fn set_policy(&self, policy: HandshakePolicy) {
        self.shared.state.lock().policy = policy;
    }

    /// Every handshake received so far, oldest first.
    #[must_use]
    pub fn handshakes(&self) -> Vec<HandshakeRequest> {
        self.shared.state.lock().handshakes.clone()
    }

    /// Handshakes waiting for a manual answer.
    #[must_use]
    pub fn pending_handshakes(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Acknowledge the oldest held handshake.
    ///
    /// Returns `false` if none was held or its client already gave up.
    pub fn accept_next(&self) -> bool {
        self.answer_next(Ok(()))
    }

    /// Reject the oldest held handshake.
    pub fn reject_next(&self, reason: &str) -> bool {
        self.answer_next(Err(reason.to_string()))
    }

    fn answer_next(&self, answer: Result<(), String>) -> bool {
        let pending = self.shared.state.lock().pending.pop_front();
        pending.is_some_and(|handshake| handshake.reply.send(answer).is_ok())
    }

    /// Number of open connections.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.shared.state.lock().connections.len()
    }

    /// Subscriptions of all open connections.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<SubscriptionSpec> {
        self.shared
            .state
            .lock()
            .connections
            .values()
            .flat_map(|connection| connection.subscriptions.iter().cloned())
            .collect()
    }

    /// Push `body` to every connection subscribed to `destination`.
    ///
    /// Returns the number of connections it was delivered to.
    pub fn send(&self, destination: &str, body: &str) -> usize {
        let mut state = self.shared.state.lock();
        state.next_message_id += 1;
        let message_id = state.next_message_id;

        let mut delivered = 0;
        for connection in state.connections.values() {
            for spec in connection.subscriptions.iter().filter(|s| s.destination == destination) {
                let message = InboundMessage {
                    subscription: spec.id.clone(),
                    destination: destination.to_string(),
                    body: body.to_string(),
                };
                if connection.inbound.send(Ok(message)).is_ok() {
                    delivered += 1;
                }
            }
        }
        debug!(destination = destination, message_id = message_id, delivered = delivered, "Loopback message sent");
        delivered
    }

    /// Fail every open connection with `error`, then close it.
    pub fn fail_connections(&self, error: TransportError) {
        let connections = std::mem::take(&mut self.shared.state.lock().connections);
        for connection in connections.values() {
            let _ = connection.inbound.send(Err(error.clone()));
        }
        drop(connections);
        self.shared.changed.notify_waiters();
    }

    /// Close every open connection from the server side.
    pub fn drop_connections(&self) {
        let connections = std::mem::take(&mut self.shared.state.lock().connections);
        debug!(count = connections.len(), "Loopback server dropping connections");
        drop(connections);
        self.shared.changed.notify_waiters();
    }

    /// Wait until at least `count` handshakes have been received.
    pub async fn wait_for_handshakes(&self, count: usize) {
        self.wait_until(|state| state.handshakes.len() >= count).await;
    }

    /// Wait until at least `count` subscriptions are live.
    pub async fn wait_for_subscriptions(&self, count: usize) {
        self.wait_until(|state| {
            state
                .connections
                .values()
                .map(|c| c.subscriptions.len())
                .sum::<usize>()
                >= count
        })
        .await;
    }

    async fn wait_until(&self, condition: impl Fn(&LoopbackState) -> bool) {
        loop {
            let changed = self.shared.changed.notified();
            let ready = {
                let state = self.shared.state.lock();
                condition(&state)
            };
            if ready {
                return;
            }
            changed.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_01_session::Credential;

    fn request() -> HandshakeRequest {
        HandshakeRequest {
            url: "ws://loopback".to_string(),
            credential: Credential::new("a.b.c"),
        }
    }

    #[tokio::test]
    async fn test_accepted_channel_receives_subscribed_messages() {
        let (connector, server) = loopback();
        let mut channel = connector.open(request()).await.unwrap();
        channel
            .subscribe(&SubscriptionSpec::new("s1", "/topic/a"))
            .await
            .unwrap();

        assert_eq!(server.send("/topic/a", "hello"), 1);
        assert_eq!(server.send("/topic/b", "ignored"), 0);

        let message = channel.next_message().await.unwrap().unwrap();
        assert_eq!(message.subscription, "s1");
        assert_eq!(message.body, "hello");
    }

    #[tokio::test]
    async fn test_refused_handshake() {
        let (connector, server) = loopback();
        server.set_policy(HandshakePolicy::Refuse);

        assert!(matches!(
            connector.open(request()).await,
            Err(TransportError::Connect { .. })
        ));
        assert_eq!(server.handshakes().len(), 1);
        assert_eq!(server.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_manual_rejection() {
        let (connector, server) = loopback();
        server.set_policy(HandshakePolicy::Manual);

        let opening = tokio::spawn(async move { connector.open(request()).await.map(|_| ()) });
        server.wait_for_handshakes(1).await;
        assert!(server.reject_next("bad token"));

        assert_eq!(
            opening.await.unwrap(),
            Err(TransportError::Rejected("bad token".to_string()))
        );
    }

    #[tokio::test]
    async fn test_server_drop_ends_stream() {
        let (connector, server) = loopback();
        let mut channel = connector.open(request()).await.unwrap();
        assert_eq!(server.open_connections(), 1);

        server.drop_connections();

        assert!(channel.next_message().await.is_none());
        assert_eq!(server.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_client_close_releases_connection() {
        let (connector, server) = loopback();
        let mut channel = connector.open(request()).await.unwrap();
        channel.close().await;
        assert_eq!(server.open_connections(), 0);
    }
}
