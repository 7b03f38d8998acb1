//! Discovery receive loop.

// ============================================================================
// Imports
// ============================================================================

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::descriptor::{DeviceDescriptor, DeviceInfo, DeviceMatcher};
use super::fetch::{DescriptorFetcher, HttpFetcher};
use super::ssdp::{self, DEFAULT_MX, ROOT_DEVICE_TARGET, SearchRequest};

// ============================================================================
// Constants
// ============================================================================

/// Default search window.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on one descriptor fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Default multicast TTL.
pub const DEFAULT_MULTICAST_TTL: u32 = 2;

/// Receive buffer; SSDP replies fit in one datagram.
const RECV_BUFFER_SIZE: usize = 2048;

// ============================================================================
// DiscoveryOptions
// ============================================================================

/// Options for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Total search window.
    pub timeout: Duration,
    /// Where the search is sent.
    pub target: SocketAddr,
    /// `ST` header.
    pub search_target: String,
    /// `MX` header.
    pub mx: u8,
    /// Multicast TTL.
    pub ttl: u32,
    /// Bound on one descriptor fetch, clamped to the remaining window.
    pub fetch_timeout: Duration,
    /// Accepted devices.
    pub matcher: DeviceMatcher,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryOptions {
    /// Creates options for an LG webOS root-device search.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
            target: ssdp::multicast_target(),
            search_target: ROOT_DEVICE_TARGET.to_string(),
            mx: DEFAULT_MX,
            ttl: DEFAULT_MULTICAST_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            matcher: DeviceMatcher::default(),
        }
    }

    /// Sets the search window.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends the search somewhere other than the multicast group.
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: SocketAddr) -> Self {
        self.target = target;
        self
    }

    /// Sets the `ST` header.
    #[inline]
    #[must_use]
    pub fn with_search_target(mut self, search_target: impl Into<String>) -> Self {
        self.search_target = search_target.into();
        self
    }

    /// Sets the `MX` header.
    #[inline]
    #[must_use]
    pub fn with_mx(mut self, mx: u8) -> Self {
        self.mx = mx;
        self
    }

    /// Sets the multicast TTL.
    #[inline]
    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the per-descriptor fetch bound.
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the device matcher.
    #[inline]
    #[must_use]
    pub fn with_matcher(mut self, matcher: DeviceMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    fn search_request(&self) -> SearchRequest {
        SearchRequest {
            host: self.target,
            search_target: self.search_target.clone(),
            mx: self.mx,
        }
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// SSDP search for one matching device.
#[derive(Debug, Clone)]
pub struct Discovery<F = HttpFetcher> {
    options: DiscoveryOptions,
    fetcher: F,
}

impl Discovery<HttpFetcher> {
    /// Creates a search that fetches descriptors over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(options: DiscoveryOptions) -> Result<Self> {
        Ok(Self::with_fetcher(options, HttpFetcher::new()?))
    }
}

impl<F: DescriptorFetcher> Discovery<F> {
    /// Creates a search with a custom descriptor fetcher.
    #[must_use]
    pub fn with_fetcher(options: DiscoveryOptions, fetcher: F) -> Self {
        Self { options, fetcher }
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Sends one search and returns the first matching device.
    ///
    /// Returns `Ok(None)` when the window closes without a match. Bad
    /// replies and descriptors are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the socket cannot be bound, configured,
    /// written or read.
    pub async fn discover(&self) -> Result<Option<DeviceDescriptor>> {
        let deadline = Instant::now() + self.options.timeout;

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_multicast_ttl_v4(self.options.ttl)?;

        let request = self.options.search_request();
        socket
            .send_to(&request.to_bytes(), self.options.target)
            .await?;

        debug!(
            target_addr = %self.options.target,
            search_target = %self.options.search_target,
            timeout_ms = self.options.timeout.as_millis() as u64,
            "M-SEARCH sent"
        );

        let mut buf = [0u8; RECV_BUFFER_SIZE];

        loop {
            let (len, source) = match timeout_at(deadline, socket.recv_from(&mut buf)).await {
                Ok(received) => received?,
                Err(_) => {
                    info!("No matching device found before the deadline");
                    return Ok(None);
                }
            };

            match self.inspect(&buf[..len], source, deadline).await {
                Ok(Some(device)) => {
                    info!(
                        ip = %device.ip,
                        name = %device.friendly_name,
                        model = %device.model_name,
                        "Discovered TV"
                    );
                    return Ok(Some(device));
                }
                Ok(None) => {}
                Err(e) => warn!(%source, error = %e, "Skipping discovery candidate"),
            }
        }
    }

    /// Checks one reply.
    ///
    /// `Ok(None)` means the reply is not a candidate; `Err` means the
    /// candidate's descriptor could not be used.
    async fn inspect(
        &self,
        datagram: &[u8],
        source: SocketAddr,
        deadline: Instant,
    ) -> Result<Option<DeviceDescriptor>> {
        let Ok(reply) = std::str::from_utf8(datagram) else {
            debug!(%source, "Ignoring non-UTF-8 reply");
            return Ok(None);
        };

        let Some(location) = ssdp::location(reply) else {
            trace!(%source, "Ignoring reply without LOCATION");
            return Ok(None);
        };

        let location = Url::parse(location)
            .map_err(|e| Error::descriptor_fetch(location, e.to_string()))?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let fetch_timeout = self.options.fetch_timeout.min(remaining);

        let xml = timeout_at(deadline, self.fetcher.fetch(&location, fetch_timeout))
            .await
            .map_err(|_| Error::descriptor_fetch(location.as_str(), "deadline reached"))??;

        let info = DeviceInfo::parse(&xml)
            .map_err(|e| Error::descriptor_fetch(location.as_str(), e.to_string()))?;

        if !self.options.matcher.matches(&info) {
            debug!(
                %source,
                manufacturer = ?info.manufacturer,
                model = ?info.model_name,
                "Device does not match"
            );
            return Ok(None);
        }

        Ok(Some(info.into_descriptor(source.ip(), location)))
    }
}

// ============================================================================
// Convenience
// ============================================================================

/// Searches for an LG webOS TV for up to `timeout`.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> webos_remote::Result<()> {
/// use std::time::Duration;
///
/// if let Some(tv) = webos_remote::discover(Duration::from_secs(5)).await? {
///     println!("found {tv}");
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] on socket failure.
pub async fn discover(timeout: Duration) -> Result<Option<DeviceDescriptor>> {
    Discovery::new(DiscoveryOptions::new().with_timeout(timeout))?
        .discover()
        .await
}

// ============================================================================
// Tests
// ============================================================================
