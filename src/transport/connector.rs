//! Endpoint construction and WebSocket dialing.
//!
//! The TV serves SSAP on `wss://<ip>:3001` with a self-signed certificate
//! that is not bound to any stable hostname, so both certificate chain
//! validation and hostname verification are turned off. Older firmware
//! also serves plain `ws://<ip>:3000`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use native_tls::TlsConnector;
use tokio::net::TcpStream;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream produced by [`dial`].
pub type TvStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// Scheme
// ============================================================================

/// Transport scheme of the SSAP endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain WebSocket.
    Ws,
    /// WebSocket over TLS.
    #[default]
    Wss,
}

impl Scheme {
    /// Returns the port the TV listens on for this scheme.
    #[inline]
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::Ws => 3000,
            Self::Wss => 3001,
        }
    }

    /// Returns the URL scheme.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Builds the endpoint URL for a TV address.
///
/// # Errors
///
/// Returns [`Error::Url`] if the address cannot form a valid URL.
pub fn endpoint_url(ip: IpAddr, scheme: Scheme, port: u16) -> Result<Url> {
    let url = Url::parse(&format!("{scheme}://{}", SocketAddr::new(ip, port)))?;
    Ok(url)
}

/// Builds a TLS connector that accepts the TV's self-signed certificate.
///
/// # Errors
///
/// Returns [`Error::Tls`] if the platform TLS backend fails to initialize.
pub fn insecure_tls_connector() -> Result<TlsConnector> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()?;
    Ok(connector)
}

/// Opens the WebSocket connection to an endpoint.
///
/// # Errors
///
/// - [`Error::Tls`] if the TLS connector cannot be built
/// - [`Error::Connection`] if the TCP, TLS or WebSocket handshake fails
pub async fn dial(endpoint: &Url) -> Result<TvStream> {
    let connector = match endpoint.scheme() {
        "wss" => Some(Connector::NativeTls(insecure_tls_connector()?)),
        _ => None,
    };

    debug!(endpoint = %endpoint, "Dialing");

    let (ws_stream, response) =
        connect_async_tls_with_config(endpoint.as_str(), None, true, connector)
            .await
            .map_err(|e| Error::connection(format!("{endpoint}: {e}")))?;

    debug!(endpoint = %endpoint, status = %response.status(), "WebSocket upgraded");

    Ok(ws_stream)
}

// ============================================================================
// Tests
// ============================================================================
