//! Command outcome.
//!
//! Per-command failures are data, not errors: a TV-side `error` or an id
//! mismatch leaves the session usable, so [`Session::send_command`]
//! returns them as [`CommandResponse`] variants.
//!
//! [`Session::send_command`]: super::Session::send_command

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{IncomingMessage, Inbound};

// ============================================================================
// CommandResponse
// ============================================================================

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResponse {
    /// The TV answered; carries `payload`, or the whole message when it has
    /// no `payload` field.
    Payload(Value),

    /// The TV answered with an `error` message.
    Failed {
        /// Target resource of the request.
        uri: String,
        /// Error text from the TV.
        error: String,
        /// Error payload from the TV.
        payload: Value,
    },

    /// The answer carried a different id; the channel is out of sync.
    CorrelationMismatch {
        /// Id of the request that was sent.
        expected: RequestId,
        /// Id found in the answer.
        received: Option<String>,
    },
}

impl CommandResponse {
    /// Classifies the answer to request `id`.
    pub(crate) fn correlate(id: RequestId, uri: &str, inbound: Inbound) -> Self {
        let received = inbound.id();
        if !received.is_some_and(|r| id.matches(r)) {
            warn!(
                expected = %id,
                received = ?received,
                uri = %uri,
                "Response id does not match request"
            );
            return Self::CorrelationMismatch {
                expected: id,
                received: received.map(str::to_string),
            };
        }

        match inbound.message {
            IncomingMessage::Error { error, payload, .. } => {
                let error = error.unwrap_or_else(|| "unknown error".to_string());
                warn!(%id, uri = %uri, error = %error, "TV returned an error");
                Self::Failed {
                    uri: uri.to_string(),
                    error,
                    payload,
                }
            }
            _ => {
                let mut raw = inbound.raw;
                let payload = raw
                    .as_object_mut()
                    .and_then(|object| object.remove("payload"));
                Self::Payload(payload.unwrap_or(raw))
            }
        }
    }

    /// Returns `true` for [`CommandResponse::Payload`].
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Payload(_))
    }

    /// Returns `true` for [`CommandResponse::CorrelationMismatch`].
    #[inline]
    #[must_use]
    pub fn is_correlation_mismatch(&self) -> bool {
        matches!(self, Self::CorrelationMismatch { .. })
    }

    /// Returns the payload, `None` for failures.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Payload(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the response, returning the payload or `None`.
    #[inline]
    #[must_use]
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Self::Payload(value) => Some(value),
            _ => None,
        }
    }

    /// Converts failures into errors.
    ///
    /// # Errors
    ///
    /// - [`Error::Command`] for [`CommandResponse::Failed`]
    /// - [`Error::CorrelationMismatch`] for [`CommandResponse::CorrelationMismatch`]
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Payload(value) => Ok(value),
            Self::Failed {
                uri,
                error,
                payload,
            } => Err(Error::Command {
                uri,
                message: error,
                payload,
            }),
            Self::CorrelationMismatch { expected, received } => {
                Err(Error::CorrelationMismatch { expected, received })
            }
        }
    }

    /// Reads a field of the payload.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload().and_then(|payload| payload.get(key))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    const URI: &str = "ssap://audio/getVolume";

    fn inbound(text: &str) -> Inbound {
        Inbound::parse(text).expect("valid frame")
    }

    #[test]
    fn test_payload_is_returned() {
        let response = CommandResponse::correlate(
            RequestId::new(1),
            URI,
            inbound(r#"{"type":"response","id":"cmd_1","payload":{"volume":12,"muted":false}}"#),
        );

        assert!(response.is_ok());
        assert_eq!(response.get("volume"), Some(&json!(12)));
        assert_eq!(
            response.into_result().expect("ok"),
            json!({"volume": 12, "muted": false})
        );
    }

    #[test]
    fn test_whole_message_without_payload() {
        let response = CommandResponse::correlate(
            RequestId::new(2),
            URI,
            inbound(r#"{"type":"response","id":"cmd_2","returnValue":true}"#),
        );

        assert_eq!(
            response.into_payload(),
            Some(json!({"type": "response", "id": "cmd_2", "returnValue": true}))
        );
    }

    #[test]
    fn test_untyped_answer_is_payload() {
        let response = CommandResponse::correlate(
            RequestId::new(1),
            URI,
            inbound(r#"{"id":"cmd_1","payload":{"volume":3}}"#),
        );
        assert_eq!(response, CommandResponse::Payload(json!({"volume": 3})));
    }

    #[test]
    fn test_unknown_type_with_matching_id_is_payload() {
        let response = CommandResponse::correlate(
            RequestId::new(6),
            URI,
            inbound(r#"{"type":"hello","id":"cmd_6","returnValue":true}"#),
        );
        assert_eq!(
            response.into_payload(),
            Some(json!({"type": "hello", "id": "cmd_6", "returnValue": true}))
        );
    }

    #[test]
    fn test_mismatched_id() {
        let response = CommandResponse::correlate(
            RequestId::new(3),
            URI,
            inbound(r#"{"type":"response","id":"cmd_2","payload":{}}"#),
        );

        assert_eq!(
            response,
            CommandResponse::CorrelationMismatch {
                expected: RequestId::new(3),
                received: Some("cmd_2".into()),
            }
        );
        assert!(response.payload().is_none());
        assert!(matches!(
            response.into_result(),
            Err(Error::CorrelationMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_id_is_mismatch() {
        let response = CommandResponse::correlate(
            RequestId::new(1),
            URI,
            inbound(r#"{"type":"response","payload":{}}"#),
        );
        assert!(response.is_correlation_mismatch());
    }

    #[test]
    fn test_error_message() {
        let response = CommandResponse::correlate(
            RequestId::new(4),
            URI,
            inbound(r#"{"type":"error","id":"cmd_4","error":"401 insufficient permissions","payload":{}}"#),
        );

        match &response {
            CommandResponse::Failed { uri, error, .. } => {
                assert_eq!(uri, URI);
                assert_eq!(error, "401 insufficient permissions");
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert!(response.into_payload().is_none());
    }

    #[test]
    fn test_error_into_result() {
        let response = CommandResponse::correlate(
            RequestId::new(5),
            URI,
            inbound(r#"{"type":"error","id":"cmd_5","error":"500 boom"}"#),
        );
        let err = response.into_result().expect_err("failed");
        assert_eq!(
            err.to_string(),
            "Command ssap://audio/getVolume failed: 500 boom"
        );
    }
}
