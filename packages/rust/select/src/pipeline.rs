//! End-to-end selection pipeline: reference URLs → winning image URL.
//!
//! 1. Gather scored candidates across the article's reference pages
//! 2. Submit the surviving subset to the vision judge
//! 3. Return the winner, or the explicit absence value
//!
//! Nothing in here is fatal to the caller: every failure degrades to fewer
//! candidates or `None`, so a text-only post is always still possible.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use url::Url;

use coverpick_extract::gather_candidates;
use coverpick_fetch::ImageFetcher;
use coverpick_judge::RelevanceJudge;
use coverpick_shared::SelectionConfig;

use crate::selector::select_best_image;

/// Find the best illustrative image for an article.
///
/// `description` is the natural-language target (topic + generated body
/// text); `reference_urls` are the article's reference links. Returns the
/// winning absolute URL, or `None` when no candidate survives. An empty
/// reference list short-circuits before any network call.
#[instrument(skip_all, fields(pages = reference_urls.len()))]
pub async fn find_article_image(
    fetcher: Arc<dyn ImageFetcher>,
    judge: Arc<dyn RelevanceJudge>,
    description: &str,
    reference_urls: &[Url],
    config: &SelectionConfig,
) -> Option<String> {
    if reference_urls.is_empty() {
        debug!("no reference urls, skipping image search");
        return None;
    }

    let scored = gather_candidates(fetcher.as_ref(), reference_urls, config).await;
    if scored.is_empty() {
        info!("no image candidates survived filtering");
        return None;
    }

    let candidates: Vec<Url> = scored
        .iter()
        .filter_map(|image| Url::parse(&image.resolved_src).ok())
        .collect();

    info!(candidates = candidates.len(), "submitting candidates to the judge");
    let chosen = select_best_image(fetcher, judge, description, &candidates, config).await;

    match &chosen {
        Some(url) => info!(%url, "image selected"),
        None => info!("no image selected"),
    }

    chosen
}
