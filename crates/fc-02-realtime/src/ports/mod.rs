//! # Ports
//!
//! Outbound dependencies of the connection manager.

use crate::domain::SessionNotice;
use crate::error::TransportError;
use async_trait::async_trait;
use fc_01_session::{Credential, SessionEvaluator};

/// Parameters of one channel-opening attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// Endpoint to connect to.
    pub url: String,
    /// Credential attached at connection time.
    pub credential: Credential,
}

impl HandshakeRequest {
    /// Value of the `Authorization` header sent with the handshake.
    #[must_use]
    pub fn authorization(&self) -> String {
        self.credential.bearer_header()
    }
}

/// A destination the channel should deliver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionSpec {
    /// Client-chosen subscription identifier, echoed on every message.
    pub id: String,
    /// Server destination.
    pub destination: String,
}

impl SubscriptionSpec {
    /// Create a subscription spec.
    pub fn new(id: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            destination: destination.into(),
        }
    }
}

/// A message pushed by the server on a subscribed destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Identifier of the subscription that matched.
    pub subscription: String,
    /// Destination the message was sent to.
    pub destination: String,
    /// Raw body text.
    pub body: String,
}

/// Opens channels to the server.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    /// Open a channel.
    ///
    /// Resolves once the server has acknowledged the handshake. The future
    /// may be dropped at any point to abandon the attempt.
    async fn open(
        &self,
        request: HandshakeRequest,
    ) -> Result<Box<dyn RealtimeChannel>, TransportError>;
}

/// An open, acknowledged channel.
#[async_trait]
pub trait RealtimeChannel: Send {
    /// Ask the server to deliver `spec.destination` on this channel.
    async fn subscribe(&mut self, spec: &SubscriptionSpec) -> Result<(), TransportError>;

    /// Next pushed message, in arrival order.
    ///
    /// Returns `None` once the server has closed the channel. Must be
    /// cancel-safe.
    async fn next_message(&mut self) -> Option<Result<InboundMessage, TransportError>>;

    /// Close the channel gracefully.
    async fn close(&mut self);
}

/// Authentication view the connection manager needs from the session.
pub trait SessionGate: Send + Sync {
    /// Whether the session is currently authenticated.
    fn is_authenticated(&self) -> bool;

    /// Credential to attach, if the session is authenticated.
    fn credential(&self) -> Option<Credential>;
}

impl SessionGate for SessionEvaluator {
    fn is_authenticated(&self) -> bool {
        SessionEvaluator::is_authenticated(self)
    }

    fn credential(&self) -> Option<Credential> {
        SessionEvaluator::credential(self)
    }
}

/// Receives server-side session expiry notices.
///
/// Implementations surface the notice to the user; they must not end the
/// session themselves.
pub trait SessionNoticeSink: Send + Sync {
    /// Called once per notice.
    fn session_expired(&self, notice: &SessionNotice);
}
