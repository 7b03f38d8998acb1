//! Registration handshake.
//!
//! Opens the socket, then runs on it before the connection event loop takes
//! over: send `register`, then read frames until `registered` or `error`.
//!
//! The first time a client registers the TV shows an accept/deny prompt and
//! answers with a `response` frame (`pairingType: PROMPT`) before the user
//! decides. With a valid stored key the TV answers `registered` directly.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{Instant, timeout, timeout_at};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::identifiers::ClientKey;
use crate::protocol::{IncomingMessage, Inbound, OutgoingMessage, RegisterPayload};

use super::state::{PairingEvent, PairingState};

// ============================================================================
// Registration
// ============================================================================

/// Outcome of a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The TV accepted the stored key; nothing to persist.
    Reused(ClientKey),
    /// The TV issued a key that differs from the stored one.
    Issued(ClientKey),
}

impl Registration {
    /// Returns the key now valid for this TV.
    #[inline]
    #[must_use]
    pub fn client_key(&self) -> &ClientKey {
        match self {
            Self::Reused(key) | Self::Issued(key) => key,
        }
    }

    /// Returns `true` if the key must be persisted.
    #[inline]
    #[must_use]
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Issued(_))
    }

    /// Decides the outcome from the issued and stored keys.
    fn resolve(issued: Option<ClientKey>, stored: Option<ClientKey>) -> Result<Self> {
        match (issued, stored) {
            (Some(issued), Some(stored)) if issued == stored => Ok(Self::Reused(stored)),
            (Some(issued), _) => Ok(Self::Issued(issued)),
            (None, Some(stored)) => Ok(Self::Reused(stored)),
            (None, None) => Err(Error::protocol(
                "TV registered the client without issuing a client-key",
            )),
        }
    }
}

// ============================================================================
// Handshake
// ============================================================================

/// Drives the pairing state machine from dial to registration.
#[derive(Debug)]
pub struct Handshake {
    payload: RegisterPayload,
    registration_timeout: Duration,
    state: PairingState,
}

impl Handshake {
    /// Creates a handshake in [`PairingState::Disconnected`].
    ///
    /// # Arguments
    ///
    /// * `payload` - Register payload, carrying the stored key if any
    /// * `registration_timeout` - Time allowed for the user to answer the prompt
    #[must_use]
    pub fn new(payload: RegisterPayload, registration_timeout: Duration) -> Self {
        Self {
            payload,
            registration_timeout,
            state: PairingState::Disconnected,
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Awaits `dial` for at most `connect_timeout`.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the socket does not open in time
    /// - the error of `dial` if it fails
    /// - [`Error::Protocol`] if the handshake was already started
    pub async fn open<S, F>(
        &mut self,
        dial: F,
        connect_timeout: Duration,
    ) -> Result<WebSocketStream<S>>
    where
        F: Future<Output = Result<WebSocketStream<S>>>,
    {
        self.transition(PairingEvent::Dial)?;

        match timeout(connect_timeout, dial).await {
            Ok(Ok(ws_stream)) => {
                self.transition(PairingEvent::Dialed)?;
                Ok(ws_stream)
            }
            Ok(Err(e)) => {
                self.transition(PairingEvent::TransportFailed)?;
                Err(e)
            }
            Err(_) => {
                self.transition(PairingEvent::TimedOut)?;
                Err(Error::timeout(
                    "connect",
                    connect_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Sends `register` on the socket returned by [`open`](Self::open) and
    /// waits for the outcome.
    ///
    /// The socket is left open on failure; dropping it releases it.
    ///
    /// # Errors
    ///
    /// - [`Error::RegistrationFailed`] if the TV answers with `error`
    /// - [`Error::Timeout`] if no outcome arrives in time
    /// - [`Error::ConnectionClosed`] / [`Error::WebSocket`] on transport failure
    /// - [`Error::Protocol`] if the TV registers without any usable key, or
    ///   the socket was not opened through [`open`](Self::open)
    pub async fn run<S>(&mut self, ws_stream: &mut WebSocketStream<S>) -> Result<Registration>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        if self.state != PairingState::AwaitingRegistration {
            return Err(Error::protocol(format!(
                "cannot register in state {}",
                self.state
            )));
        }

        let stored = self.payload.client_key.clone();
        let frame = OutgoingMessage::register(self.payload.clone()).to_json()?;

        if let Err(e) = ws_stream.send(Message::Text(frame.into())).await {
            self.transition(PairingEvent::TransportFailed)?;
            return Err(e.into());
        }

        if stored.is_some() {
            debug!("Register sent with stored client-key");
        } else {
            info!("Register sent; accept the pairing prompt on the TV");
        }

        let deadline = Instant::now() + self.registration_timeout;

        loop {
            let next = match timeout_at(deadline, ws_stream.next()).await {
                Ok(next) => next,
                Err(_) => {
                    self.transition(PairingEvent::TimedOut)?;
                    return Err(Error::timeout(
                        "registration",
                        self.registration_timeout.as_millis() as u64,
                    ));
                }
            };

            let text = match next {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "TV closed the socket during registration");
                    self.transition(PairingEvent::TransportFailed)?;
                    return Err(Error::ConnectionClosed);
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.transition(PairingEvent::TransportFailed)?;
                    return Err(e.into());
                }
                None => {
                    self.transition(PairingEvent::TransportFailed)?;
                    return Err(Error::ConnectionClosed);
                }
            };

            let inbound = match Inbound::parse(text.as_str()) {
                Ok(inbound) => inbound,
                Err(e) => {
                    warn!(error = %e, "Ignoring unparsable frame during registration");
                    continue;
                }
            };

            match &inbound.message {
                IncomingMessage::Registered { .. } => {
                    let registration =
                        match Registration::resolve(inbound.message.client_key(), stored) {
                            Ok(registration) => registration,
                            Err(e) => {
                                self.transition(PairingEvent::PeerError)?;
                                return Err(e);
                            }
                        };
                    self.transition(PairingEvent::Registered)?;
                    info!(
                        new_key = registration.is_new(),
                        key = %registration.client_key().redacted(),
                        "Registered with TV"
                    );
                    return Ok(registration);
                }

                IncomingMessage::Error { payload, .. } => {
                    self.transition(PairingEvent::PeerError)?;
                    let message = inbound.message.error_text().unwrap_or_default();
                    warn!(error = %message, "TV rejected registration");
                    return Err(Error::registration_failed(message, payload.clone()));
                }

                IncomingMessage::Response { payload, .. } => {
                    self.transition(PairingEvent::Prompted)?;
                    let pairing_type = payload
                        .as_ref()
                        .and_then(|p| p.get("pairingType"))
                        .and_then(|v| v.as_str());
                    debug!(?pairing_type, "Registration acknowledged, waiting for user");
                }

                IncomingMessage::Unknown => {
                    debug!(raw = %inbound.raw, "Ignoring unknown frame during registration");
                }
            }
        }
    }

    fn transition(&mut self, event: PairingEvent) -> Result<()> {
        self.state = self.state.on(event)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};
    use tokio::io::{DuplexStream, duplex};
    use tokio_tungstenite::tungstenite::protocol::Role;

    async fn socket_pair() -> (WebSocketStream<DuplexStream>, WebSocketStream<DuplexStream>) {
        let (client_io, server_io) = duplex(64 * 1024);
        let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
        (client, server)
    }

    /// Moves `handshake` to `AwaitingRegistration` with an already open socket.
    async fn open(
        handshake: &mut Handshake,
        client: WebSocketStream<DuplexStream>,
    ) -> WebSocketStream<DuplexStream> {
        handshake
            .open(async { Ok(client) }, Duration::from_secs(1))
            .await
            .expect("open")
    }

    /// Reads the register frame and answers with `replies`.
    fn fake_tv(
        mut server: WebSocketStream<DuplexStream>,
        replies: Vec<Value>,
    ) -> tokio::task::JoinHandle<Value> {
        tokio::spawn(async move {
            let register = loop {
                match server.next().await {
                    Some(Ok(Message::Text(text))) => {
                        break serde_json::from_str::<Value>(text.as_str()).expect("json");
                    }
                    Some(Ok(_)) => continue,
                    other => panic!("unexpected read: {other:?}"),
                }
            };
            for reply in replies {
                server
                    .send(Message::Text(reply.to_string().into()))
                    .await
                    .expect("send");
            }
            // Keep the socket open until the client is done
            let _ = server.next().await;
            register
        })
    }

    #[tokio::test]
    async fn test_first_pairing_issues_key() {
        let (client, server) = socket_pair().await;
        let tv = fake_tv(
            server,
            vec![
                json!({"type":"response","id":"register_0","payload":{"pairingType":"PROMPT","returnValue":true}}),
                json!({"type":"registered","id":"register_0","payload":{"client-key":"fresh-key"}}),
            ],
        );

        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));
        let mut client = open(&mut handshake, client).await;
        let registration = handshake.run(&mut client).await.expect("registered");

        assert_eq!(registration, Registration::Issued(ClientKey::new("fresh-key")));
        assert_eq!(handshake.state(), PairingState::Registered);

        drop(client);
        let register = tv.await.expect("tv");
        assert_eq!(register["type"], "register");
        assert_eq!(register["id"], "register_0");
        assert!(register["payload"].get("client-key").is_none());
    }

    #[tokio::test]
    async fn test_stored_key_is_reused() {
        let (client, server) = socket_pair().await;
        let tv = fake_tv(
            server,
            vec![json!({"type":"registered","id":"register_0","payload":{"client-key":"stored"}})],
        );

        let payload = RegisterPayload::new(Some(ClientKey::new("stored")));
        let mut handshake = Handshake::new(payload, Duration::from_secs(5));
        let mut client = open(&mut handshake, client).await;
        let registration = handshake.run(&mut client).await.expect("registered");

        assert_eq!(registration, Registration::Reused(ClientKey::new("stored")));
        assert!(!registration.is_new());

        drop(client);
        let register = tv.await.expect("tv");
        assert_eq!(register["payload"]["client-key"], "stored");
    }

    #[tokio::test]
    async fn test_rotated_key_is_issued() {
        let (client, server) = socket_pair().await;
        let _tv = fake_tv(
            server,
            vec![json!({"type":"registered","id":"register_0","payload":{"client-key":"rotated"}})],
        );

        let payload = RegisterPayload::new(Some(ClientKey::new("old")));
        let mut handshake = Handshake::new(payload, Duration::from_secs(5));
        let mut client = open(&mut handshake, client).await;
        let registration = handshake.run(&mut client).await.expect("registered");

        assert_eq!(registration, Registration::Issued(ClientKey::new("rotated")));
    }

    #[tokio::test]
    async fn test_error_fails_registration() {
        let (client, server) = socket_pair().await;
        let _tv = fake_tv(
            server,
            vec![json!({"type":"error","id":"register_0","error":"403 User denied access","payload":{"reason":"deny"}})],
        );

        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));
        let mut client = open(&mut handshake, client).await;
        let err = handshake.run(&mut client).await.expect_err("denied");

        match err {
            Error::RegistrationFailed { message, payload } => {
                assert_eq!(message, "403 User denied access");
                assert_eq!(payload["reason"], "deny");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(handshake.state(), PairingState::Failed);
    }

    #[tokio::test]
    async fn test_registered_without_any_key_is_protocol_error() {
        let (client, server) = socket_pair().await;
        let _tv = fake_tv(
            server,
            vec![json!({"type":"registered","id":"register_0","payload":{}})],
        );

        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));
        let mut client = open(&mut handshake, client).await;
        let err = handshake.run(&mut client).await.expect_err("no key");
        assert!(matches!(err, Error::Protocol { .. }));
        assert_eq!(handshake.state(), PairingState::Failed);
    }

    #[tokio::test]
    async fn test_garbage_frames_are_skipped() {
        let (client, mut server) = socket_pair().await;
        let _tv = tokio::spawn(async move {
            let _ = server.next().await;
            server
                .send(Message::Text("not json".into()))
                .await
                .expect("send");
            server
                .send(Message::Text(
                    r#"{"type":"registered","payload":{"client-key":"k"}}"#.into(),
                ))
                .await
                .expect("send");
            let _ = server.next().await;
        });

        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));
        let mut client = open(&mut handshake, client).await;
        let registration = handshake.run(&mut client).await.expect("registered");
        assert_eq!(registration.client_key().as_str(), "k");
    }

    #[tokio::test]
    async fn test_registration_times_out() {
        let (client, server) = socket_pair().await;
        let _tv = fake_tv(server, vec![]);

        let mut handshake =
            Handshake::new(RegisterPayload::new(None), Duration::from_millis(50));
        let mut client = open(&mut handshake, client).await;
        let err = handshake.run(&mut client).await.expect_err("timeout");

        assert!(err.is_timeout());
        assert_eq!(handshake.state(), PairingState::Failed);
    }

    #[tokio::test]
    async fn test_remote_close_during_registration() {
        let (client, mut server) = socket_pair().await;
        let _tv = tokio::spawn(async move {
            let _ = server.next().await;
            server.close(None).await.expect("close");
        });

        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));
        let mut client = open(&mut handshake, client).await;
        let err = handshake.run(&mut client).await.expect_err("closed");
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_open_walks_dial_states() {
        let (client, _server) = socket_pair().await;
        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));
        assert_eq!(handshake.state(), PairingState::Disconnected);

        let _client = open(&mut handshake, client).await;
        assert_eq!(handshake.state(), PairingState::AwaitingRegistration);
    }

    #[tokio::test]
    async fn test_failed_dial_fails_handshake() {
        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));
        let dial = async {
            Err::<WebSocketStream<DuplexStream>, _>(Error::connection("refused"))
        };

        let err = handshake
            .open(dial, Duration::from_secs(1))
            .await
            .expect_err("refused");

        assert!(err.is_connection_error());
        assert_eq!(handshake.state(), PairingState::Failed);
    }

    #[tokio::test]
    async fn test_dial_timeout_fails_handshake() {
        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));
        let dial = std::future::pending::<Result<WebSocketStream<DuplexStream>>>();

        let err = handshake
            .open(dial, Duration::from_millis(50))
            .await
            .expect_err("timeout");

        assert!(err.is_timeout());
        assert_eq!(handshake.state(), PairingState::Failed);
    }

    #[tokio::test]
    async fn test_run_requires_open_socket() {
        let (mut client, _server) = socket_pair().await;
        let mut handshake = Handshake::new(RegisterPayload::new(None), Duration::from_secs(5));

        let err = handshake.run(&mut client).await.expect_err("not opened");

        assert!(matches!(err, Error::Protocol { .. }));
        assert_eq!(handshake.state(), PairingState::Disconnected);
    }
}
