//! Builder pattern for session configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use webos_remote::{EnvFileCredentialStore, Session};
//!
//! # async fn example() -> webos_remote::Result<()> {
//! let store = EnvFileCredentialStore::discover()?;
//! let session = Session::builder()
//!     .credential_store(Arc::new(store))
//!     .connect("192.168.1.50".parse().expect("ip"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::identifiers::ClientKey;
use crate::pairing::{CredentialStore, Handshake, MemoryCredentialStore};
use crate::protocol::{Manifest, RegisterPayload};
use crate::transport::{dial, endpoint_url};

use super::core::Session;
use super::options::SessionOptions;

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for configuring and opening a [`Session`].
///
/// Use [`Session::builder()`] to create a new builder.
#[derive(Clone)]
pub struct SessionBuilder {
    /// Key to send instead of asking the store.
    client_key: Option<ClientKey>,
    /// Where issued keys go.
    credential_store: Arc<dyn CredentialStore>,
    /// Capability declaration.
    manifest: Manifest,
    /// Connection options.
    options: SessionOptions,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("client_key", &self.client_key)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SessionBuilder Implementation
// ============================================================================

impl SessionBuilder {
    /// Creates a builder with default options and an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client_key: None,
            credential_store: Arc::new(MemoryCredentialStore::new()),
            manifest: Manifest::default(),
            options: SessionOptions::default(),
        }
    }

    /// Sets a previously issued key.
    ///
    /// Takes precedence over [`CredentialStore::load`].
    #[inline]
    #[must_use]
    pub fn client_key(mut self, key: impl Into<ClientKey>) -> Self {
        self.client_key = Some(key.into());
        self
    }

    /// Sets the credential store.
    #[inline]
    #[must_use]
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = store;
        self
    }

    /// Replaces the capability manifest.
    #[inline]
    #[must_use]
    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Sets connection options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the configured options.
    #[inline]
    #[must_use]
    pub fn get_options(&self) -> &SessionOptions {
        &self.options
    }

    /// Connects to the TV at `ip` and registers.
    ///
    /// On first use the TV shows a prompt; this call waits up to
    /// `registration_timeout` for the user to accept.
    ///
    /// # Errors
    ///
    /// - [`Error::CredentialStore`](crate::Error::CredentialStore) if the store cannot be read
    /// - [`Error::Timeout`](crate::Error::Timeout) if connecting or registering takes too long
    /// - [`Error::Connection`](crate::Error::Connection) if the socket cannot be opened
    /// - [`Error::RegistrationFailed`](crate::Error::RegistrationFailed) if the TV rejects the client
    pub async fn connect(self, ip: IpAddr) -> Result<Session> {
        let endpoint = endpoint_url(ip, self.options.scheme, self.options.effective_port())?;

        let stored = match self.client_key {
            Some(key) => Some(key),
            None => self.credential_store.load().await?,
        };
        debug!(has_key = stored.is_some(), "Resolved stored client-key");

        let payload = RegisterPayload {
            force_pairing: self.options.force_pairing,
            pairing_type: self.options.pairing_type,
            manifest: self.manifest,
            client_key: stored,
        };

        info!(%endpoint, "Connecting to TV");

        let mut handshake = Handshake::new(payload, self.options.registration_timeout);
        let ws_stream = handshake
            .open(dial(&endpoint), self.options.connect_timeout)
            .await?;

        Session::establish(
            ws_stream,
            handshake,
            ip,
            endpoint,
            self.credential_store,
            self.options,
        )
        .await
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

    use crate::transport::Scheme;

    #[test]
    fn test_default_builder() {
        let builder = SessionBuilder::new();
        assert!(builder.client_key.is_none());
        assert_eq!(builder.get_options(), &SessionOptions::default());
    }

    #[test]
    fn test_debug_hides_key() {
        let builder = SessionBuilder::new().client_key("super-secret-key");
        let debug = format!("{builder:?}");
        assert!(!debug.contains("super-secret-key"));
    }

    #[test]
    fn test_options_replace() {
        let options = SessionOptions::new().with_scheme(Scheme::Ws).with_port(9);
        let builder = SessionBuilder::new().options(options.clone());
        assert_eq!(builder.get_options(), &options);
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let options = SessionOptions::new()
            .with_scheme(Scheme::Ws)
            .with_port(1)
            .with_connect_timeout(Duration::from_secs(2));

        let err = SessionBuilder::new()
            .options(options)
            .connect(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .await
            .expect_err("nothing listens on port 1");

        assert!(err.is_connection_error() || err.is_timeout());
    }
}
