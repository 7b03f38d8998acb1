//! Session connection options.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use webos_remote::SessionOptions;
//!
//! let options = SessionOptions::new()
//!     .with_request_timeout(Duration::from_secs(5))
//!     .with_ping_interval(None);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::protocol::PairingType;
use crate::transport::Scheme;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for opening the socket.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time for the user to answer the pairing prompt.
pub const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for one command.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default keepalive period.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(20);

// ============================================================================
// SessionOptions
// ============================================================================

/// Options controlling how a [`Session`](super::Session) connects and waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Transport scheme.
    pub scheme: Scheme,

    /// Port override; the scheme's default port when `None`.
    pub port: Option<u16>,

    /// Timeout for TCP + TLS + WebSocket upgrade.
    pub connect_timeout: Duration,

    /// Timeout for the registration handshake.
    pub registration_timeout: Duration,

    /// Timeout for each command.
    pub request_timeout: Duration,

    /// Keepalive ping period; `None` disables pings.
    pub ping_interval: Option<Duration>,

    /// Prompt style requested in the register message.
    pub pairing_type: PairingType,

    /// Ask the TV to prompt even if the key is known.
    pub force_pairing: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SessionOptions {
    /// Creates options for `wss://<ip>:3001` with default timeouts.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scheme: Scheme::Wss,
            port: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            registration_timeout: DEFAULT_REGISTRATION_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            ping_interval: Some(DEFAULT_PING_INTERVAL),
            pairing_type: PairingType::Prompt,
            force_pairing: false,
        }
    }

    /// Returns the port to dial.
    #[inline]
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SessionOptions {
    /// Sets the transport scheme.
    #[inline]
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Overrides the port.
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the registration timeout.
    #[inline]
    #[must_use]
    pub fn with_registration_timeout(mut self, timeout: Duration) -> Self {
        self.registration_timeout = timeout;
        self
    }

    /// Sets the per-command timeout.
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the keepalive period.
    #[inline]
    #[must_use]
    pub fn with_ping_interval(mut self, interval: Option<Duration>) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Sets the pairing prompt style.
    #[inline]
    #[must_use]
    pub fn with_pairing_type(mut self, pairing_type: PairingType) -> Self {
        self.pairing_type = pairing_type;
        self
    }

    /// Forces the pairing prompt.
    #[inline]
    #[must_use]
    pub fn with_force_pairing(mut self, force: bool) -> Self {
        self.force_pairing = force;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
