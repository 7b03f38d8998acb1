//! WebSocket connection and event loop.
//!
//! This module owns the registered WebSocket to the TV and routes each
//! incoming frame to the single outstanding request.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Outgoing request frames from the session
//! - Incoming frames from the TV, delivered to the pending waiter
//! - Keepalive pings
//! - Failing the pending waiter with [`Error::ConnectionClosed`] on shutdown
//!
//! # Correlation
//!
//! SSAP is used strictly one request at a time: the next text frame after a
//! request is that request's answer. The connection therefore keeps one
//! pending slot instead of a map, and the session checks the echoed id.

// ============================================================================
// Imports
// ============================================================================

use std::future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, timeout};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::Inbound;

// ============================================================================
// Constants
// ============================================================================

/// Time allowed for the event loop to finish after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// ============================================================================
// Types
// ============================================================================

/// The one request awaiting its answer.
struct PendingRequest {
    id: RequestId,
    response_tx: oneshot::Sender<Result<Inbound>>,
}

/// Shared pending slot.
type PendingSlot = Arc<Mutex<Option<PendingRequest>>>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a serialized request frame.
    Send { id: RequestId, frame: String },
    /// Close the WebSocket.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// Registered WebSocket connection to a TV.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone. Only one request may be
/// outstanding at a time; a second concurrent [`request`](Self::request) is
/// rejected with [`Error::Protocol`].
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Pending slot (shared with event loop).
    pending: PendingSlot,
    /// Event loop task, taken by the first shutdown that awaits it.
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Clone for Connection {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            pending: Arc::clone(&self.pending),
            task: Arc::clone(&self.task),
        }
    }
}

impl Connection {
    /// Creates a new connection from a registered WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn new<S>(ws_stream: WebSocketStream<S>, ping_interval: Option<Duration>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let pending: PendingSlot = Arc::new(Mutex::new(None));

        let keepalive = ping_interval.map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        let task = tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&pending),
            keepalive,
        ));

        Self {
            command_tx,
            pending,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Sends a request frame and waits for the next incoming message.
    ///
    /// # Arguments
    ///
    /// * `id` - Id carried by `frame`, used for logging and timeout cleanup
    /// * `frame` - Serialized request
    /// * `request_timeout` - Maximum time to wait for the answer
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if another request is still in flight
    /// - [`Error::ConnectionClosed`] if the connection is or becomes closed
    /// - [`Error::RequestTimeout`] if no message arrives within the timeout
    pub async fn request(
        &self,
        id: RequestId,
        frame: String,
        request_timeout: Duration,
    ) -> Result<Inbound> {
        let (response_tx, response_rx) = oneshot::channel();

        {
            let mut slot = self.pending.lock();
            if let Some(current) = slot.as_ref() {
                warn!(in_flight = %current.id, rejected = %id, "Request already in flight");
                return Err(Error::protocol(format!(
                    "request {} is still in flight; SSAP requests must not overlap",
                    current.id
                )));
            }
            *slot = Some(PendingRequest { id, response_tx });
        }

        if self
            .command_tx
            .send(ConnectionCommand::Send { id, frame })
            .is_err()
        {
            self.clear_pending(id);
            return Err(Error::ConnectionClosed);
        }

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                self.clear_pending(id);
                Err(Error::request_timeout(
                    id,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Returns `true` while a request awaits its answer.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Returns `true` once the event loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Asks the event loop to close the WebSocket.
    ///
    /// Returns immediately; see [`close`](Self::close) to wait.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Closes the WebSocket and waits for the event loop to finish.
    ///
    /// Safe to call more than once.
    pub async fn close(&self) {
        self.shutdown();

        let task = self.task.lock().take();
        if let Some(task) = task {
            match timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Event loop task failed"),
                Err(_) => warn!("Event loop did not stop within grace period"),
            }
        }
    }

    /// Removes the pending entry if it still belongs to `id`.
    fn clear_pending(&self, id: RequestId) {
        let mut slot = self.pending.lock();
        if slot.as_ref().is_some_and(|p| p.id == id) {
            slot.take();
            debug!(%id, "Cleared pending request");
        }
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        ws_stream: WebSocketStream<S>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        pending: PendingSlot,
        mut keepalive: Option<Interval>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from the TV
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(text.as_str(), &pending);
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by TV");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the session
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { id, frame }) => {
                            Self::handle_send_command(id, frame, &mut ws_write, &pending).await;
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }

                // Keepalive
                _ = async {
                    match keepalive.as_mut() {
                        Some(ticker) => ticker.tick().await,
                        None => future::pending::<Instant>().await,
                    }
                } => {
                    if let Err(e) = ws_write.send(Message::Ping(Default::default())).await {
                        warn!(error = %e, "Failed to send keepalive ping");
                        break;
                    }
                    trace!("Keepalive ping sent");
                }
            }
        }

        // Refuse new requests before failing the pending one
        command_rx.close();
        Self::fail_pending_request(&pending);

        debug!("Event loop terminated");
    }

    /// Delivers an incoming text frame to the pending request.
    fn handle_incoming_message(text: &str, pending: &PendingSlot) {
        let parsed = Inbound::parse(text);

        let Some(request) = pending.lock().take() else {
            match parsed {
                Ok(inbound) => warn!(
                    kind = inbound.message.kind(),
                    id = ?inbound.id(),
                    "Unsolicited message dropped"
                ),
                Err(e) => warn!(error = %e, text = %text, "Unparsable unsolicited message dropped"),
            }
            return;
        };

        trace!(id = %request.id, "Answer received");
        let _ = request.response_tx.send(parsed);
    }

    /// Writes a request frame.
    async fn handle_send_command<S>(
        id: RequestId,
        frame: String,
        ws_write: &mut SplitSink<WebSocketStream<S>, Message>,
        pending: &PendingSlot,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        if let Err(e) = ws_write.send(Message::Text(frame.into())).await {
            let request = pending.lock().take();
            if let Some(request) = request {
                let _ = request
                    .response_tx
                    .send(Err(Error::connection(e.to_string())));
            }
            return;
        }

        trace!(%id, "Request sent");
    }

    /// Fails the pending request with ConnectionClosed.
    fn fail_pending_request(pending: &PendingSlot) {
        let request = pending.lock().take();
        if let Some(request) = request {
            debug!(id = %request.id, "Failed pending request on shutdown");
            let _ = request.response_tx.send(Err(Error::ConnectionClosed));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
