//! Core Session struct, request path and accessors.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::{ClientKey, RequestIdGenerator};
use crate::pairing::{CredentialStore, Handshake, PairingEvent, PairingState, Registration};
use crate::protocol::{Command, OutgoingMessage};
use crate::transport::Connection;

use super::builder::SessionBuilder;
use super::options::SessionOptions;
use super::response::CommandResponse;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a session.
pub(crate) struct SessionInner {
    /// TV address.
    pub ip: IpAddr,
    /// Dialed endpoint.
    pub endpoint: Url,
    /// Registered connection.
    pub connection: Connection,
    /// Handshake outcome.
    pub registration: Registration,
    /// Request id sequence.
    pub ids: RequestIdGenerator,
    /// Pairing state.
    pub state: Mutex<PairingState>,
    /// Options the session was opened with.
    pub options: SessionOptions,
}

// ============================================================================
// Session
// ============================================================================

/// A registered session with one TV.
///
/// Cloning is cheap; clones share the connection and the id sequence.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("state", &self.state())
            .field("client_key", self.inner.registration.client_key())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Runs `handshake` on the socket it opened and starts the event loop.
    ///
    /// A newly issued key is handed to `store` once. A failing store is
    /// logged; the session stays usable.
    pub(crate) async fn establish<S>(
        mut ws_stream: WebSocketStream<S>,
        mut handshake: Handshake,
        ip: IpAddr,
        endpoint: Url,
        store: Arc<dyn CredentialStore>,
        options: SessionOptions,
    ) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let registration = handshake.run(&mut ws_stream).await?;

        if let Registration::Issued(key) = &registration {
            match store.persist(key).await {
                Ok(()) => debug!(key = %key.redacted(), "Persisted client-key"),
                Err(e) => warn!(error = %e, "Failed to persist client-key"),
            }
        }

        let connection = Connection::new(ws_stream, options.ping_interval);

        info!(%endpoint, "Session established");

        Ok(Self {
            inner: Arc::new(SessionInner {
                ip,
                endpoint,
                connection,
                registration,
                ids: RequestIdGenerator::new(),
                state: Mutex::new(handshake.state()),
                options,
            }),
        })
    }
}

// ============================================================================
// Session - Accessors
// ============================================================================

impl Session {
    /// Returns the TV address.
    #[inline]
    #[must_use]
    pub fn ip(&self) -> IpAddr {
        self.inner.ip
    }

    /// Returns the dialed endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Returns the key the TV accepted.
    #[inline]
    #[must_use]
    pub fn client_key(&self) -> &ClientKey {
        self.inner.registration.client_key()
    }

    /// Returns how the session was registered.
    #[inline]
    #[must_use]
    pub fn registration(&self) -> &Registration {
        &self.inner.registration
    }

    /// Returns the options the session was opened with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    /// Returns the pairing state.
    ///
    /// Reports [`PairingState::Closed`] once the TV has dropped the socket.
    #[must_use]
    pub fn state(&self) -> PairingState {
        let state = *self.inner.state.lock();
        if state.is_ready() && self.inner.connection.is_closed() {
            PairingState::Closed
        } else {
            state
        }
    }

    /// Returns `true` while requests can be sent.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_ready()
    }
}

// ============================================================================
// Session - Requests
// ============================================================================

impl Session {
    /// Sends one request and waits for its answer.
    ///
    /// # Arguments
    ///
    /// * `uri` - Target resource, e.g. `ssap://audio/getVolume`
    /// * `payload` - Request payload; `{}` is sent when `None`
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the session is closed
    /// - [`Error::Protocol`] if another request is in flight
    /// - [`Error::RequestTimeout`] if the TV does not answer in time
    ///
    /// TV-side errors and id mismatches are returned as
    /// [`CommandResponse`] variants.
    pub async fn send_command(&self, uri: &str, payload: Option<Value>) -> Result<CommandResponse> {
        if !self.is_connected() {
            return Err(Error::ConnectionClosed);
        }

        let id = self.inner.ids.next_id();
        let frame = OutgoingMessage::request(id, uri, payload).to_json()?;

        debug!(%id, uri = %uri, "Sending request");

        let inbound = self
            .inner
            .connection
            .request(id, frame, self.inner.options.request_timeout)
            .await?;

        Ok(CommandResponse::correlate(id, uri, inbound))
    }

    /// Sends a typed command.
    ///
    /// # Errors
    ///
    /// Same as [`send_command`](Self::send_command).
    pub async fn execute(&self, command: impl Into<Command>) -> Result<CommandResponse> {
        let command = command.into();
        self.send_command(command.uri(), command.payload()).await
    }

    /// Closes the session.
    ///
    /// Idempotent. A request still waiting fails with
    /// [`Error::ConnectionClosed`].
    pub async fn close(&self) {
        {
            let mut state = self.inner.state.lock();
            if *state == PairingState::Closed {
                return;
            }
            if let Ok(next) = state.on(PairingEvent::Close) {
                *state = next;
            }
        }

        self.inner.connection.close().await;
        info!(endpoint = %self.inner.endpoint, "Session closed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::Ipv4Addr;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio::io::{DuplexStream, duplex};
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::protocol::Role;

    use crate::pairing::MemoryCredentialStore;
    use crate::protocol::{AudioCommand, RegisterPayload};

    async fn socket_pair() -> (WebSocketStream<DuplexStream>, WebSocketStream<DuplexStream>) {
        let (client_io, server_io) = duplex(64 * 1024);
        let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
        (client, server)
    }

    /// Registers the client with `key`, then answers each request with its
    /// own id and uri.
    fn fake_tv(mut server: WebSocketStream<DuplexStream>, key: &'static str) {
        tokio::spawn(async move {
            while let Some(Ok(message)) = server.next().await {
                let Message::Text(text) = message else {
                    continue;
                };
                let frame: Value = serde_json::from_str(text.as_str()).expect("json");
                let reply = if frame["type"] == "register" {
                    json!({"type": "registered", "id": "register_0", "payload": {"client-key": key}})
                } else {
                    json!({"type": "response", "id": frame["id"], "payload": {"uri": frame["uri"]}})
                };
                if server.send(Message::Text(reply.to_string().into())).await.is_err() {
                    break;
                }
            }
        });
    }

    async fn session(store: Arc<MemoryCredentialStore>, stored: Option<&str>) -> Session {
        let (client, server) = socket_pair().await;
        fake_tv(server, "tv-key");

        let endpoint = Url::parse("ws://127.0.0.1:3000").expect("url");
        let payload = RegisterPayload::new(stored.map(ClientKey::new));
        let options = SessionOptions::new()
            .with_request_timeout(Duration::from_secs(5))
            .with_ping_interval(None);

        let mut handshake = Handshake::new(payload, options.registration_timeout);
        let client = handshake
            .open(async { Ok(client) }, options.connect_timeout)
            .await
            .expect("open");

        Session::establish(
            client,
            handshake,
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            endpoint,
            store,
            options,
        )
        .await
        .expect("session")
    }

    #[test]
    fn test_session_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Session>();
    }

    #[test]
    fn test_session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }

    #[tokio::test]
    async fn test_new_key_is_persisted_once() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(Arc::clone(&store), None).await;

        assert_eq!(store.persisted(), vec![ClientKey::new("tv-key")]);
        assert!(session.registration().is_new());
        assert_eq!(session.state(), PairingState::Registered);
    }

    #[tokio::test]
    async fn test_matching_key_is_not_persisted() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(Arc::clone(&store), Some("tv-key")).await;

        assert!(store.persisted().is_empty());
        assert_eq!(session.client_key().as_str(), "tv-key");
    }

    #[tokio::test]
    async fn test_requests_use_increasing_ids() {
        let session = session(Arc::new(MemoryCredentialStore::new()), None).await;

        let first = session.execute(AudioCommand::GetVolume).await.expect("first");
        let second = session
            .send_command("ssap://audio/getMute", None)
            .await
            .expect("second");

        assert_eq!(first.get("uri"), Some(&json!("ssap://audio/getVolume")));
        assert_eq!(second.get("uri"), Some(&json!("ssap://audio/getMute")));
        assert_eq!(session.inner.ids.issued(), 2);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let session = session(Arc::new(MemoryCredentialStore::new()), None).await;

        session.close().await;
        session.close().await;

        assert_eq!(session.state(), PairingState::Closed);
        assert!(!session.is_connected());
        let err = session
            .send_command("ssap://audio/getVolume", None)
            .await
            .expect_err("closed");
        assert!(matches!(err, Error::ConnectionClosed));
    }
}
