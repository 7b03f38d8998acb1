//! SSDP search message and reply parsing.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::LazyLock;

use regex::Regex;

// ============================================================================
// Constants
// ============================================================================

/// SSDP multicast group.
pub const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// SSDP port.
pub const SSDP_PORT: u16 = 1900;

/// Search target for root devices.
pub const ROOT_DEVICE_TARGET: &str = "upnp:rootdevice";

/// Max-wait hint sent with the search.
pub const DEFAULT_MX: u8 = 5;

/// Matches a `LOCATION` header line, any case.
static LOCATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^location[ \t]*:[ \t]*(\S+)[ \t]*\r?$").expect("valid pattern")
});

/// Returns the multicast group address and port.
#[inline]
#[must_use]
pub fn multicast_target() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(SSDP_MULTICAST_ADDR, SSDP_PORT))
}

// ============================================================================
// SearchRequest
// ============================================================================

/// An `M-SEARCH` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// `HOST` header.
    pub host: SocketAddr,
    /// `ST` header.
    pub search_target: String,
    /// `MX` header, in seconds.
    pub mx: u8,
}

impl SearchRequest {
    /// Creates a root-device search addressed to the multicast group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: multicast_target(),
            search_target: ROOT_DEVICE_TARGET.to_string(),
            mx: DEFAULT_MX,
        }
    }

    /// Encodes the request for the wire.
    #[inline]
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M-SEARCH * HTTP/1.1\r\n\
             HOST: {}\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: {}\r\n\
             ST: {}\r\n\
             \r\n",
            self.host, self.mx, self.search_target
        )
    }
}

// ============================================================================
// Reply Parsing
// ============================================================================

/// Returns the `LOCATION` header of a search reply.
#[must_use]
pub fn location(reply: &str) -> Option<&str> {
    LOCATION_HEADER
        .captures(reply)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_search_message() {
        let request = SearchRequest::new();
        assert_eq!(
            request.to_string(),
            "M-SEARCH * HTTP/1.1\r\n\
             HOST: 239.255.255.250:1900\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: 5\r\n\
             ST: upnp:rootdevice\r\n\
             \r\n"
        );
    }

    #[test]
    fn test_custom_search_target() {
        let request = SearchRequest {
            search_target: "urn:schemas-upnp-org:device:MediaRenderer:1".into(),
            mx: 2,
            ..SearchRequest::new()
        };
        let text = request.to_string();
        assert!(text.contains("\r\nST: urn:schemas-upnp-org:device:MediaRenderer:1\r\n"));
        assert!(text.contains("\r\nMX: 2\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_location_any_case() {
        let reply = "HTTP/1.1 200 OK\r\n\
                     CACHE-CONTROL: max-age=1800\r\n\
                     location: http://10.0.0.5:1400/desc.xml\r\n\
                     ST: upnp:rootdevice\r\n\r\n";
        assert_eq!(location(reply), Some("http://10.0.0.5:1400/desc.xml"));

        let reply = "HTTP/1.1 200 OK\r\nLocation:http://10.0.0.6/d.xml\r\n\r\n";
        assert_eq!(location(reply), Some("http://10.0.0.6/d.xml"));
    }

    #[test]
    fn test_location_with_bare_newlines() {
        let reply = "HTTP/1.1 200 OK\nLOCATION: http://10.0.0.7:1400/desc.xml  \nEXT:\n";
        assert_eq!(location(reply), Some("http://10.0.0.7:1400/desc.xml"));
    }

    #[test]
    fn test_missing_location() {
        let reply = "HTTP/1.1 200 OK\r\nST: upnp:rootdevice\r\nX-LOCATION-HINT: none\r\n\r\n";
        assert_eq!(location(reply), None);
    }
}
