//! Error types for the webOS remote.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use webos_remote::{Result, Session};
//!
//! async fn example(session: &Session) -> Result<()> {
//!     session.set_volume(15).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Arguments | [`Error::InvalidArgument`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::WebSocket`], [`Error::Tls`] |
//! | Pairing | [`Error::RegistrationFailed`], [`Error::CredentialStore`], [`Error::Dotenv`] |
//! | Protocol | [`Error::Protocol`], [`Error::CorrelationMismatch`], [`Error::Command`] |
//! | Timing | [`Error::Timeout`], [`Error::RequestTimeout`] |
//! | Discovery | [`Error::DescriptorFetch`], [`Error::Http`], [`Error::Xml`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Url`] |
//!
//! Per-command failures ([`Error::CorrelationMismatch`], [`Error::Command`])
//! are normally reported as data through
//! [`CommandResponse`](crate::session::CommandResponse) and only become
//! errors when the caller opts in with `into_result()`.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Everything that can go wrong talking to a TV.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Argument Errors
    // ========================================================================
    /// Local precondition violated before any I/O.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport-level connection failure.
    #[error("Cannot reach TV: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection closed locally or by the TV.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Pairing Errors
    // ========================================================================
    /// The TV answered the register request with an `error` message.
    #[error("Registration failed: {message}")]
    RegistrationFailed {
        /// Error text reported by the TV.
        message: String,
        /// Full error payload from the TV.
        payload: Value,
    },

    /// Credential store failure.
    #[error("Credential store error: {message}")]
    CredentialStore {
        /// Description of the store failure.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected message.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Response id did not match the outstanding request.
    #[error("Correlation mismatch: expected {expected}, received {received:?}")]
    CorrelationMismatch {
        /// Id of the request that was sent.
        expected: RequestId,
        /// Id carried by the response, if any.
        received: Option<String>,
    },

    /// The TV answered a request with an `error` message.
    #[error("Command {uri} failed: {message}")]
    Command {
        /// Target resource of the failed request.
        uri: String,
        /// Error text reported by the TV.
        message: String,
        /// Full error payload from the TV.
        payload: Value,
    },

    // ========================================================================
    // Timing Errors
    // ========================================================================
    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Command request timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Discovery Errors
    // ========================================================================
    /// Descriptor document could not be fetched or parsed.
    ///
    /// Discovery logs and skips these; they never abort the receive loop.
    #[error("Descriptor fetch failed for {location}: {message}")]
    DescriptorFetch {
        /// Advertised descriptor URL.
        location: String,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// TLS connector setup error.
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Dotenv file error.
    #[error("Dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// XML parse error.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a registration failure from the TV's error message.
    #[inline]
    pub fn registration_failed(message: impl Into<String>, payload: Value) -> Self {
        Self::RegistrationFailed {
            message: message.into(),
            payload,
        }
    }

    /// Creates a credential store error.
    #[inline]
    pub fn credential_store(message: impl Into<String>) -> Self {
        Self::CredentialStore {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates a descriptor fetch error.
    #[inline]
    pub fn descriptor_fetch(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DescriptorFetch {
            location: location.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RequestTimeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_) | Self::Tls(_)
        )
    }

    /// Returns `true` if the session can keep serving requests after this error.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CorrelationMismatch { .. }
                | Self::Command { .. }
                | Self::InvalidArgument { .. }
                | Self::RequestTimeout { .. }
                | Self::DescriptorFetch { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
