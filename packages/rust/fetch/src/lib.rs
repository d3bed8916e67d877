//! HTTP fetcher collaborator for the selection pipeline.
//!
//! This crate provides:
//! - [`ImageFetcher`] — the async fetch seam injected into the extractor,
//!   selector, and pipeline (mockable in tests)
//! - [`HttpFetcher`] — the `reqwest` implementation with bounded timeouts
//! - [`probe`] — URL resolution, proxy-path exclusion, and size probing

pub mod probe;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use coverpick_shared::{CoverpickError, Result};

pub use probe::{is_proxy_src, probe_size, resolve_candidate_url};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("coverpick/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Network access for pages and images.
///
/// Implementations are handed to the core functions for the duration of a
/// selection batch. Any non-2xx status or transport error is a failure;
/// callers decide whether a failure drops a candidate or a page.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch a URL and return the raw response body.
    async fn fetch_bytes(&self, url: &Url) -> Result<Bytes>;

    /// Fetch a URL and return the response body as text.
    async fn fetch_text(&self, url: &Url) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Reqwest implementation
// ---------------------------------------------------------------------------

/// `reqwest`-backed fetcher with a per-call timeout and limited redirects.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given per-call timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| CoverpickError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn get_checked(&self, url: &Url) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| CoverpickError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoverpickError::Network(format!("{url}: HTTP {status}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &Url) -> Result<Bytes> {
        let response = self.get_checked(url).await?;
        response
            .bytes()
            .await
            .map_err(|e| CoverpickError::Network(format!("{url}: body read failed: {e}")))
    }

    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let response = self.get_checked(url).await?;
        response
            .text()
            .await
            .map_err(|e| CoverpickError::Network(format!("{url}: body read failed: {e}")))
    }
}
