//! Type-safe identifiers for session entities.
//!
//! Newtype wrappers keep request ids and credentials from being mixed
//! with arbitrary strings.
//!
//! | Type | Wire form |
//! |------|-----------|
//! | [`RequestId`] | `"cmd_<n>"` |
//! | [`ClientKey`] | opaque string issued by the TV |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Constants
// ============================================================================

/// Fixed id carried by the register message.
pub const REGISTER_ID: &str = "register_0";

/// Prefix of command request ids.
const REQUEST_PREFIX: &str = "cmd_";

// ============================================================================
// RequestId
// ============================================================================

/// Identifier of one command request within a session.
///
/// Rendered on the wire as `cmd_<n>`. Ids are allocated by
/// [`RequestIdGenerator`] and are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request id from its sequence number.
    #[inline]
    #[must_use]
    pub const fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Returns the sequence number.
    #[inline]
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.0
    }

    /// Returns `true` if `wire` is the rendered form of this id.
    #[must_use]
    pub fn matches(&self, wire: &str) -> bool {
        wire.strip_prefix(REQUEST_PREFIX)
            .is_some_and(|n| n == self.0.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{REQUEST_PREFIX}{}", self.0)
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// RequestIdGenerator
// ============================================================================

/// Session-scoped allocator of [`RequestId`]s.
///
/// The first id handed out is `cmd_1`. Ids are never reused.
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    last: AtomicU64,
}

impl RequestIdGenerator {
    /// Creates a generator whose first id is `cmd_1`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Allocates the next id.
    #[inline]
    pub fn next_id(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Returns how many ids have been allocated.
    #[inline]
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

// ============================================================================
// ClientKey
// ============================================================================

/// Credential issued by the TV after the user accepts the pairing prompt.
///
/// `Debug` output is redacted so the key does not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientKey(String);

impl ClientKey {
    /// Wraps a raw credential string.
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw credential.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short, log-safe prefix of the key.
    #[must_use]
    pub fn redacted(&self) -> String {
        let visible: String = self.0.chars().take(4).collect();
        format!("{visible}…")
    }
}

impl fmt::Debug for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClientKey").field(&self.redacted()).finish()
    }
}

impl From<&str> for ClientKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ClientKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId::new(7).to_string(), "cmd_7");
    }

    #[test]
    fn test_request_id_serializes_as_string() {
        let json = serde_json::to_string(&RequestId::new(12)).expect("serialize");
        assert_eq!(json, "\"cmd_12\"");
    }

    #[test]
    fn test_request_id_matches() {
        let id = RequestId::new(3);
        assert!(id.matches("cmd_3"));
        assert!(!id.matches("cmd_4"));
        assert!(!id.matches("cmd_03"));
        assert!(!id.matches("register_0"));
        assert!(!id.matches("3"));
    }

    #[test]
    fn test_generator_starts_at_one() {
        let generator = RequestIdGenerator::new();
        assert_eq!(generator.issued(), 0);
        assert_eq!(generator.next_id(), RequestId::new(1));
        assert_eq!(generator.next_id(), RequestId::new(2));
        assert_eq!(generator.issued(), 2);
    }

    #[test]
    fn test_client_key_debug_is_redacted() {
        let key = ClientKey::new("abcdef0123456789");
        let debug = format!("{key:?}");
        assert!(debug.contains("abcd"));
        assert!(!debug.contains("0123456789"));
    }

    #[test]
    fn test_client_key_transparent_serde() {
        let key: ClientKey = serde_json::from_str("\"k-1\"").expect("parse");
        assert_eq!(key.as_str(), "k-1");
    }

    proptest! {
        #[test]
        fn prop_ids_strictly_increase(count in 1usize..500) {
            let generator = RequestIdGenerator::new();
            let mut previous = None;
            for _ in 0..count {
                let id = generator.next_id();
                if let Some(prev) = previous {
                    prop_assert!(id > prev);
                }
                previous = Some(id);
            }
            prop_assert_eq!(generator.issued(), count as u64);
        }
    }
}
