//! Message envelope exchanged with the TV.
//!
//! Every frame is a JSON object discriminated by its `type` field. Frames
//! without one decode as [`IncomingMessage::Unknown`].
//!
//! # Format
//!
//! ```json
//! {
//!   "type": "request",
//!   "id": "cmd_3",
//!   "uri": "ssap://audio/getVolume",
//!   "payload": {}
//! }
//! ```
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | `register` | Client → TV | Pairing request with manifest |
//! | `request` | Client → TV | Command request |
//! | `registered` | TV → Client | Pairing accepted, carries `client-key` |
//! | `response` | TV → Client | Command result or pairing prompt ack |
//! | `error` | TV → Client | Pairing or command failure |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str};

use crate::error::Result;
use crate::identifiers::{ClientKey, REGISTER_ID, RequestId};

use super::manifest::RegisterPayload;

// ============================================================================
// OutgoingMessage
// ============================================================================

/// A message sent from the client to the TV.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    /// Registration (pairing) request.
    Register {
        /// Always [`REGISTER_ID`].
        id: String,
        /// Manifest and optional stored key.
        payload: RegisterPayload,
    },

    /// Command request.
    Request {
        /// Correlation id echoed by the TV.
        id: RequestId,
        /// Target resource, e.g. `ssap://audio/getVolume`.
        uri: String,
        /// Command arguments (`{}` when none).
        payload: Value,
    },
}

impl OutgoingMessage {
    /// Creates the register message.
    #[inline]
    #[must_use]
    pub fn register(payload: RegisterPayload) -> Self {
        Self::Register {
            id: REGISTER_ID.to_string(),
            payload,
        }
    }

    /// Creates a command request. A missing payload is sent as `{}`.
    #[must_use]
    pub fn request(id: RequestId, uri: impl Into<String>, payload: Option<Value>) -> Self {
        Self::Request {
            id,
            uri: uri.into(),
            payload: payload.unwrap_or_else(|| Value::Object(Default::default())),
        }
    }

    /// Serializes the message to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// IncomingMessage
// ============================================================================

/// A message received from the TV.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IncomingMessage {
    /// Pairing accepted.
    Registered {
        /// Echo of the register id.
        #[serde(default)]
        id: Option<String>,
        /// Carries `client-key`.
        #[serde(default)]
        payload: Value,
    },

    /// Command result, or the pairing prompt acknowledgement.
    Response {
        /// Echo of the request id.
        #[serde(default)]
        id: Option<String>,
        /// Result data.
        #[serde(default)]
        payload: Option<Value>,
    },

    /// Pairing or command failure.
    Error {
        /// Echo of the request id.
        #[serde(default)]
        id: Option<String>,
        /// Error text, e.g. `"403 User denied access"`.
        #[serde(default)]
        error: Option<String>,
        /// Extra error data.
        #[serde(default)]
        payload: Value,
    },

    /// Any other message type, or none at all.
    #[serde(other)]
    Unknown,
}

impl IncomingMessage {
    /// Returns the echoed id, if any.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Registered { id, .. } | Self::Response { id, .. } | Self::Error { id, .. } => {
                id.as_deref()
            }
            Self::Unknown => None,
        }
    }

    /// Returns the message type as it appears on the wire.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::Response { .. } => "response",
            Self::Error { .. } => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the `client-key` carried by a `registered` message.
    #[must_use]
    pub fn client_key(&self) -> Option<ClientKey> {
        match self {
            Self::Registered { payload, .. } => payload
                .get("client-key")
                .and_then(Value::as_str)
                .filter(|key| !key.is_empty())
                .map(ClientKey::new),
            _ => None,
        }
    }

    /// Returns the error text of an `error` message.
    #[must_use]
    pub fn error_text(&self) -> Option<&str> {
        match self {
            Self::Error { error, .. } => Some(error.as_deref().unwrap_or("unknown error")),
            _ => None,
        }
    }
}

// ============================================================================
// Inbound
// ============================================================================

/// A decoded incoming frame together with its raw JSON.
///
/// The raw form is kept because a response without a `payload` field is
/// returned to the caller whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    /// Typed view of the message.
    pub message: IncomingMessage,
    /// The complete JSON object as received.
    pub raw: Value,
}

impl Inbound {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the frame is not a
    /// JSON object.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: Value = from_str(text)?;
        let message = match raw.as_object() {
            Some(object) if !object.contains_key("type") => IncomingMessage::Unknown,
            _ => IncomingMessage::deserialize(&raw)?,
        };
        Ok(Self { message, raw })
    }

    /// Returns the `id` of the frame, whatever its type.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.raw.get("id").and_then(Value::as_str)
    }
}

// ============================================================================
// Tests
// ============================================================================
