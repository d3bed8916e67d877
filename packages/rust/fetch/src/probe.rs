//! Candidate URL resolution and size probing.
//!
//! The size metric is byte length, used consistently for the minimum-size
//! floor, the ranking bonus, and the selector's tie-break probe.

use tracing::{debug, warn};
use url::Url;

use crate::ImageFetcher;

/// Path prefixes of on-demand image proxies. A probe through one says
/// nothing about the real image, so candidates behind them are excluded
/// before any fetch.
const PROXY_PATH_PREFIXES: &[&str] = &["/_next/image", "/cdn-cgi/image/"];

/// Resolve a candidate `src` against its originating page URL.
///
/// Absolute http(s) URLs pass through; relative paths (site-relative or not)
/// are joined onto the page URL. Anything that resolves to a non-http(s)
/// scheme (`data:`, `mailto:`, ...) is rejected.
pub fn resolve_candidate_url(src: &str, page_url: &Url) -> Option<Url> {
    let trimmed = src.trim();
    if trimmed.is_empty() {
        return None;
    }

    let resolved = match Url::parse(trimmed) {
        Ok(absolute) => absolute,
        Err(_) => page_url.join(trimmed).ok()?,
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Whether a resolved URL points at a known on-demand image proxy.
pub fn is_proxy_src(url: &Url) -> bool {
    PROXY_PATH_PREFIXES
        .iter()
        .any(|prefix| url.path().starts_with(prefix))
}

/// Probe the byte size of an image URL.
///
/// Any fetch failure (timeout, non-2xx, transport error) is logged and
/// yields `None`: the candidate is excluded and the batch continues.
pub async fn probe_size(fetcher: &dyn ImageFetcher, url: &Url) -> Option<u64> {
    match fetcher.fetch_bytes(url).await {
        Ok(bytes) => {
            let size = bytes.len() as u64;
            debug!(%url, size, "probed image size");
            Some(size)
        }
        Err(e) => {
            warn!(%url, error = %e, "image probe failed, excluding candidate");
            None
        }
    }
}
