//! Shared fixtures for integration tests.
//!
//! - [`FakeTv`]: plain `ws://` SSAP endpoint on an ephemeral loopback port
//! - [`SsdpResponder`]: answers one M-SEARCH on loopback
//! - [`serve_descriptor`]: minimal HTTP server for descriptor documents

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

use webos_remote::{CredentialStore, Scheme, Session, SessionOptions};

// ============================================================================
// Constants
// ============================================================================

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Key the fake TV issues.
pub const TV_KEY: &str = "a1b2c3d4e5f6";

// ============================================================================
// Logging
// ============================================================================

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// FakeTv
// ============================================================================

/// What the fake TV does with one request.
pub enum Reply {
    /// Send this frame.
    Send(Value),
    /// Send nothing.
    Silent,
    /// Close the socket.
    Close,
}

type Responder = Arc<dyn Fn(&Value) -> Reply + Send + Sync>;

/// Answers each request with its own id and uri.
pub fn echo(frame: &Value) -> Reply {
    Reply::Send(json!({
        "type": "response",
        "id": frame["id"],
        "payload": {"returnValue": true, "uri": frame["uri"]},
    }))
}

/// Single-connection SSAP endpoint.
pub struct FakeTv {
    pub port: u16,
    frames: Arc<Mutex<Vec<Value>>>,
    task: JoinHandle<()>,
}

impl FakeTv {
    /// Registers every client with [`TV_KEY`].
    pub async fn start(responder: impl Fn(&Value) -> Reply + Send + Sync + 'static) -> Self {
        Self::start_with(
            json!({"type": "registered", "id": "register_0", "payload": {"client-key": TV_KEY}}),
            responder,
        )
        .await
    }

    /// Answers the register message with `register_reply`.
    pub async fn start_with(
        register_reply: Value,
        responder: impl Fn(&Value) -> Reply + Send + Sync + 'static,
    ) -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let responder: Responder = Arc::new(responder);

        let task = tokio::spawn(Self::serve(
            listener,
            register_reply,
            responder,
            Arc::clone(&frames),
        ));

        Self { port, frames, task }
    }

    async fn serve(
        listener: TcpListener,
        register_reply: Value,
        responder: Responder,
        frames: Arc<Mutex<Vec<Value>>>,
    ) {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = accept_async(stream).await else {
            return;
        };

        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let frame: Value = serde_json::from_str(text.as_str()).expect("client sent json");
            frames.lock().push(frame.clone());

            let reply = if frame["type"] == "register" {
                Reply::Send(register_reply.clone())
            } else {
                responder(&frame)
            };

            match reply {
                Reply::Send(value) => {
                    if ws.send(Message::Text(value.to_string().into())).await.is_err() {
                        break;
                    }
                }
                Reply::Silent => {}
                Reply::Close => {
                    let _ = ws.close(None).await;
                    break;
                }
            }
        }
    }

    /// Every frame received so far, register first.
    pub fn frames(&self) -> Vec<Value> {
        self.frames.lock().clone()
    }

    /// Received request frames, without the register message.
    pub fn requests(&self) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|frame| frame["type"] == "request")
            .collect()
    }

    /// Options pointing a session at this TV.
    pub fn options(&self) -> SessionOptions {
        SessionOptions::new()
            .with_scheme(Scheme::Ws)
            .with_port(self.port)
            .with_ping_interval(None)
            .with_connect_timeout(Duration::from_secs(5))
            .with_registration_timeout(Duration::from_secs(5))
            .with_request_timeout(Duration::from_secs(5))
    }

    /// Connects a session with `store`.
    pub async fn connect(&self, store: Arc<dyn CredentialStore>) -> Session {
        Session::builder()
            .credential_store(store)
            .options(self.options())
            .connect(LOCALHOST)
            .await
            .expect("connect")
    }
}

impl Drop for FakeTv {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// SSDP
// ============================================================================

/// Loopback stand-in for the multicast group.
pub struct SsdpResponder {
    pub addr: SocketAddr,
    task: JoinHandle<String>,
}

impl SsdpResponder {
    /// Waits `delay` after the M-SEARCH, then sends `replies`.
    pub async fn start(replies: Vec<String>, delay: Duration) -> Self {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.expect("bind");
        let addr = socket.local_addr().expect("addr");

        let task = tokio::spawn(async move {
            let mut buf = [0u8; 2048];
            let (len, peer) = socket.recv_from(&mut buf).await.expect("recv");
            tokio::time::sleep(delay).await;
            for reply in replies {
                socket.send_to(reply.as_bytes(), peer).await.expect("send");
            }
            String::from_utf8_lossy(&buf[..len]).into_owned()
        });

        Self { addr, task }
    }

    /// Returns the M-SEARCH text that was received.
    pub async fn search(self) -> String {
        self.task.await.expect("responder")
    }
}

/// Builds a search reply advertising `location`.
pub fn ssdp_reply(location: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         CACHE-CONTROL: max-age=1800\r\n\
         EXT:\r\n\
         LOCATION: {location}\r\n\
         SERVER: WebOS/4.1.0 UPnP/1.0\r\n\
         ST: upnp:rootdevice\r\n\
         USN: uuid:test::upnp:rootdevice\r\n\r\n"
    )
}

// ============================================================================
// HTTP
// ============================================================================

/// Serves `body` as `text/xml` to every request; returns the document URL.
pub async fn serve_descriptor(body: &'static str) -> String {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\n\
                     Content-Type: text/xml; charset=\"utf-8\"\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}/desc.xml")
}
