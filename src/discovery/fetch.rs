//! Descriptor document retrieval.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// DescriptorFetcher
// ============================================================================

/// Retrieves the descriptor document named by an SSDP `LOCATION`.
#[async_trait]
pub trait DescriptorFetcher: Send + Sync {
    /// Returns the document body.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be retrieved within `timeout`.
    async fn fetch(&self, location: &Url, timeout: Duration) -> Result<String>;
}

// ============================================================================
// HttpFetcher
// ============================================================================

/// Plain HTTP GET through a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher that connects directly, ignoring proxy settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder().no_proxy().build()?;
        Ok(Self { client })
    }

    /// Creates a fetcher around an existing client.
    #[inline]
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DescriptorFetcher for HttpFetcher {
    async fn fetch(&self, location: &Url, timeout: Duration) -> Result<String> {
        trace!(%location, ?timeout, "Fetching descriptor");

        let response = self
            .client
            .get(location.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::descriptor_fetch(location.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::descriptor_fetch(
                location.as_str(),
                format!("HTTP {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| Error::descriptor_fetch(location.as_str(), e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
