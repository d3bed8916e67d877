//! Candidate aggregation: probe, filter, re-score, and merge across pages.
//!
//! Probed byte size is folded into the layout score as a coarse bonus
//! (`size / divisor`). The bonus breaks ties among plausible candidates
//! without letting size drown out the layout signal.

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use coverpick_fetch::{ImageFetcher, is_proxy_src, probe_size, resolve_candidate_url};
use coverpick_shared::{ImageCandidate, ScoredImage, SelectionConfig};

use crate::extractor::extract_image_candidates;

/// Probe, filter, and re-rank one page's extracted candidates.
///
/// Candidates whose `src` cannot be resolved, points at an image proxy,
/// fails to probe, or probes below the size floor are dropped. Each
/// exclusion is per-candidate and never aborts the batch. The result is
/// stable-sorted by the combined score, descending.
pub async fn score_page_images(
    fetcher: &dyn ImageFetcher,
    page_url: &Url,
    candidates: Vec<ImageCandidate>,
    config: &SelectionConfig,
) -> Vec<ScoredImage> {
    let mut scored = Vec::new();

    for candidate in candidates {
        let Some(resolved) = resolve_candidate_url(&candidate.src, page_url) else {
            debug!(src = %candidate.src, "unresolvable candidate src, skipping");
            continue;
        };
        if is_proxy_src(&resolved) {
            debug!(%resolved, "on-demand image proxy, skipping");
            continue;
        }

        let Some(size_bytes) = probe_size(fetcher, &resolved).await else {
            continue;
        };
        if size_bytes < config.min_image_bytes {
            debug!(%resolved, size_bytes, "below size floor, skipping");
            continue;
        }

        let score = u64::from(candidate.score) + size_bytes / config.size_bonus_divisor.max(1);
        scored.push(ScoredImage {
            candidate,
            resolved_src: resolved.to_string(),
            size_bytes,
            score,
        });
    }

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Gather scored candidates across an article's reference pages.
///
/// Each page is fetched, extracted, scored, and truncated to the per-page
/// judge cap; per-page failures are logged and skipped. Pages' ranked lists
/// are concatenated without cross-page re-normalization.
pub async fn gather_candidates(
    fetcher: &dyn ImageFetcher,
    reference_urls: &[Url],
    config: &SelectionConfig,
) -> Vec<ScoredImage> {
    let mut all = Vec::new();

    for page_url in reference_urls {
        let body = match fetcher.fetch_text(page_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %page_url, error = %e, "reference page fetch failed, skipping");
                continue;
            }
        };

        // Parse and extract synchronously; `Html` must not live across an await.
        let candidates = {
            let doc = Html::parse_document(&body);
            extract_image_candidates(&doc)
        };
        if candidates.is_empty() {
            debug!(url = %page_url, "no image candidates on page");
            continue;
        }

        let mut scored = score_page_images(fetcher, page_url, candidates, config).await;
        scored.truncate(config.max_judged_per_page);

        info!(url = %page_url, kept = scored.len(), "scored page images");
        all.extend(scored);
    }

    all
}
