//! STOMP over a raw WebSocket.
//!
//! Speaks the client side of STOMP 1.2 with heart-beats disabled. The bearer
//! credential is sent twice: on the HTTP upgrade request and as a native
//! header of the `CONNECT` frame, which is where the broker's channel
//! interceptor reads it.

use crate::domain::RealtimeConfig;
use crate::error::TransportError;
use crate::ports::{ChannelConnector, HandshakeRequest, InboundMessage, RealtimeChannel, SubscriptionSpec};
use crate::stomp::{Command, StompFrame};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens STOMP channels over tokio-tungstenite.
#[derive(Debug, Clone)]
pub struct StompWsConnector {
    handshake_timeout: Duration,
}

impl StompWsConnector {
    /// Create a connector that waits at most `handshake_timeout` for `CONNECTED`.
    #[must_use]
    pub fn new(handshake_timeout: Duration) -> Self {
        Self { handshake_timeout }
    }

    /// Create a connector from realtime settings.
    #[must_use]
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(config.handshake_timeout)
    }

    async fn handshake(&self, request: &HandshakeRequest) -> Result<StompWsChannel, TransportError> {
        let connect_error = |reason: String| TransportError::Connect {
            url: request.url.clone(),
            reason,
        };

        let mut upgrade = request
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| connect_error(e.to_string()))?;
        let bearer = HeaderValue::from_str(&request.authorization())
            .map_err(|e| connect_error(format!("credential is not a valid header value: {e}")))?;
        upgrade.headers_mut().insert(AUTHORIZATION, bearer);
        let host = upgrade.uri().host().unwrap_or("localhost").to_string();

        let (mut ws, _response) = connect_async(upgrade)
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        let connect = StompFrame::new(Command::Connect)
            .with_header("accept-version", "1.2")
            .with_header("host", host)
            .with_header("heart-beat", "0,0")
            .with_header("Authorization", request.authorization());
        ws.send(Message::Text(connect.encode().into()))
            .await
            .map_err(|e| TransportError::Socket(e.to_string()))?;

        while let Some(message) = ws.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => return Err(TransportError::Closed),
                Ok(_) => continue,
                Err(e) => return Err(TransportError::Socket(e.to_string())),
            };
            let frame = match StompFrame::parse(&text) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(e) => return Err(TransportError::Protocol(e.to_string())),
            };
            match frame.command {
                Command::Connected => {
                    debug!(
                        version = frame.header("version").unwrap_or("?"),
                        "STOMP session established"
                    );
                    return Ok(StompWsChannel { ws });
                }
                Command::Error => {
                    let reason = frame.header("message").unwrap_or(&frame.body).to_string();
                    return Err(TransportError::Rejected(reason));
                }
                other => {
                    return Err(TransportError::Protocol(format!(
                        "expected CONNECTED, got {other}"
                    )))
                }
            }
        }
        Err(TransportError::Closed)
    }
}

impl Default for StompWsConnector {
    fn default() -> Self {
        Self::from_config(&RealtimeConfig::default())
    }
}

#[async_trait]
impl ChannelConnector for StompWsConnector {
    async fn open(
        &self,
        request: HandshakeRequest,
    ) -> Result<Box<dyn RealtimeChannel>, TransportError> {
        match tokio::time::timeout(self.handshake_timeout, self.handshake(&request)).await {
            Ok(Ok(channel)) => Ok(Box::new(channel)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(TransportError::HandshakeTimeout(self.handshake_timeout)),
        }
    }
}

/// An established STOMP session.
struct StompWsChannel {
    ws: WsStream,
}

impl StompWsChannel {
    async fn send_frame(&mut self, frame: &StompFrame) -> Result<(), TransportError> {
        self.ws
            .send(Message::Text(frame.encode().into()))
            .await
            .map_err(|e| TransportError::Socket(e.to_string()))
    }
}

#[async_trait]
impl RealtimeChannel for StompWsChannel {
    async fn subscribe(&mut self, spec: &SubscriptionSpec) -> Result<(), TransportError> {
        let frame = StompFrame::new(Command::Subscribe)
            .with_header("id", spec.id.as_str())
            .with_header("destination", spec.destination.as_str())
            .with_header("ack", "auto");
        self.send_frame(&frame).await
    }

    async fn next_message(&mut self) -> Option<Result<InboundMessage, TransportError>> {
        loop {
            let text = match self.ws.next().await? {
                Ok(Message::Text(text)) => text,
                Ok(Message::Ping(data)) => {
                    let _ = self.ws.send(Message::Pong(data)).await;
                    continue;
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(TransportError::Socket(e.to_string()))),
            };

            let frame = match StompFrame::parse(&text) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed STOMP frame");
                    continue;
                }
            };

            match frame.command {
                Command::Message => {
                    return Some(Ok(InboundMessage {
                        subscription: frame.header("subscription").unwrap_or_default().to_string(),
                        destination: frame.header("destination").unwrap_or_default().to_string(),
                        body: frame.body,
                    }));
                }
                Command::Error => {
                    let reason = frame.header("message").unwrap_or(&frame.body).to_string();
                    return Some(Err(TransportError::Rejected(reason)));
                }
                other => trace!(command = %other, "Ignoring STOMP frame"),
            }
        }
    }

    async fn close(&mut self) {
        let disconnect = StompFrame::new(Command::Disconnect);
        if let Err(e) = self.send_frame(&disconnect).await {
            debug!(error = %e, "DISCONNECT frame not delivered");
        }
        if let Err(e) = self.ws.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_01_session::Credential;

    #[tokio::test]
    async fn test_unreachable_server_is_connect_error() {
        let connector = StompWsConnector::new(Duration::from_secs(5));
        let request = HandshakeRequest {
            url: "ws://127.0.0.1:1/ws/websocket".to_string(),
            credential: Credential::new("a.b.c"),
        };

        assert!(matches!(
            connector.open(request).await,
            Err(TransportError::Connect { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_connect_error() {
        let connector = StompWsConnector::default();
        let request = HandshakeRequest {
            url: "not a url".to_string(),
            credential: Credential::new("a.b.c"),
        };

        assert!(matches!(
            connector.open(request).await,
            Err(TransportError::Connect { .. })
        ));
    }
}
