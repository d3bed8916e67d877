//! Vision-assisted selection: judge every candidate, pick the winner.
//!
//! Judge scores are coarse, so exact-max ties are the normal case. Ties are
//! broken by re-probed true size rather than arbitrary order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use coverpick_fetch::{ImageFetcher, probe_size};
use coverpick_judge::{RelevanceJudge, parse_percentage, relevance_prompt};
use coverpick_shared::{CoverpickError, JudgedImage, Result, SelectionConfig};

use crate::resize::resize_for_judging;

/// Judge each candidate URL against the description and return the best one.
///
/// Candidates are judged concurrently (bounded by `config.concurrency`);
/// any failure in fetch, resize, judge, or parse drops only that candidate.
/// Returns `None` when no candidate survives. Results are collected in
/// submission order, so equal judged scores and equal tie-break sizes keep
/// the first-encountered candidate.
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub async fn select_best_image(
    fetcher: Arc<dyn ImageFetcher>,
    judge: Arc<dyn RelevanceJudge>,
    description: &str,
    candidates: &[Url],
    config: &SelectionConfig,
) -> Option<String> {
    if candidates.is_empty() {
        debug!("no candidates to judge");
        return None;
    }

    let prompt = Arc::new(relevance_prompt(description));
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let max_width = config.judge_image_width;

    let mut handles = Vec::with_capacity(candidates.len());
    for url in candidates {
        let fetcher = fetcher.clone();
        let judge = judge.clone();
        let prompt = prompt.clone();
        let sem = semaphore.clone();
        let url = url.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            match judge_candidate(fetcher.as_ref(), judge.as_ref(), &prompt, &url, max_width).await
            {
                Ok(judged) => Some(judged),
                Err(e) => {
                    warn!(%url, error = %e, "candidate dropped");
                    None
                }
            }
        }));
    }

    let mut judged: Vec<JudgedImage> = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Some(image)) => judged.push(image),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "judge task failed"),
        }
    }

    if judged.is_empty() {
        info!("no candidate survived judging");
        return None;
    }

    let best = judged.iter().map(|j| j.percentage).max()?;
    let tied: Vec<&JudgedImage> = judged.iter().filter(|j| j.percentage == best).collect();
    info!(best, tied = tied.len(), judged = judged.len(), "judging complete");

    if tied.len() == 1 {
        return Some(tied[0].source_url.clone());
    }

    // Strictly-greater keeps the first-encountered candidate on equal sizes.
    let mut winner: Option<&JudgedImage> = None;
    let mut winner_size = 0u64;
    for image in tied {
        let Ok(url) = Url::parse(&image.source_url) else {
            continue;
        };
        let size = probe_size(fetcher.as_ref(), &url).await.unwrap_or(0);
        if winner.is_none() || size > winner_size {
            winner = Some(image);
            winner_size = size;
        }
    }

    winner.map(|image| image.source_url.clone())
}

/// Fetch, resize, judge, and parse one candidate.
async fn judge_candidate(
    fetcher: &dyn ImageFetcher,
    judge: &dyn RelevanceJudge,
    prompt: &str,
    url: &Url,
    max_width: u32,
) -> Result<JudgedImage> {
    let bytes = fetcher.fetch_bytes(url).await?;
    let resized = resize_for_judging(&bytes, max_width)?;
    let response = judge.judge(prompt, &resized).await?;

    let percentage = parse_percentage(&response)
        .ok_or_else(|| CoverpickError::Judge(format!("unparsable judge response: {response:?}")))?;

    debug!(%url, percentage, "candidate judged");
    Ok(JudgedImage {
        percentage,
        source_url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;

    /// Serves mapped image bytes; everything else is a network failure.
    struct MapFetcher {
        images: HashMap<String, Vec<u8>>,
    }

    impl MapFetcher {
        fn new(entries: &[(&Url, Vec<u8>)]) -> Self {
            Self {
                images: entries
                    .iter()
                    .map(|(url, bytes)| (url.as_str().to_string(), bytes.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl ImageFetcher for MapFetcher {
        async fn fetch_bytes(&self, url: &Url) -> Result<Bytes> {
            self.images
                .get(url.as_str())
                .cloned()
                .map(Bytes::from)
                .ok_or_else(|| CoverpickError::Network(format!("{url}: not mapped")))
        }

        async fn fetch_text(&self, url: &Url) -> Result<String> {
            Err(CoverpickError::Network(format!("{url}: no text in mock")))
        }
    }

    /// Rates by decoded width, so tests can pin scores per candidate without
    /// the judge seeing URLs.
    struct WidthJudge {
        by_width: HashMap<u32, String>,
    }

    #[async_trait]
    impl RelevanceJudge for WidthJudge {
        async fn judge(&self, _prompt: &str, image_jpeg: &[u8]) -> Result<String> {
            let decoded = image::load_from_memory(image_jpeg)
                .map_err(|e| CoverpickError::Judge(format!("mock decode: {e}")))?;
            Ok(self
                .by_width
                .get(&decoded.width())
                .cloned()
                .unwrap_or_else(|| "0".into()))
        }
    }

    struct ConstJudge(&'static str);

    #[async_trait]
    impl RelevanceJudge for ConstJudge {
        async fn judge(&self, _prompt: &str, _image_jpeg: &[u8]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailJudge;

    #[async_trait]
    impl RelevanceJudge for FailJudge {
        async fn judge(&self, _prompt: &str, _image_jpeg: &[u8]) -> Result<String> {
            Err(CoverpickError::Judge("model unavailable".into()))
        }
    }

    fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = Vec::new();
        img.write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut out, 95,
        ))
        .expect("encode test jpeg");
        out
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn max_ties_break_by_true_size() {
        let a = url("https://example.com/a.jpg");
        let b = url("https://example.com/b.jpg");
        let c = url("https://example.com/c.jpg");

        // Encoded sizes grow with dimensions: a < b < c.
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(MapFetcher::new(&[
            (&a, test_jpeg(40, 40)),
            (&b, test_jpeg(80, 80)),
            (&c, test_jpeg(160, 160)),
        ]));
        let judge: Arc<dyn RelevanceJudge> = Arc::new(WidthJudge {
            by_width: HashMap::from([
                (40, "80".to_string()),
                (80, "80".to_string()),
                (160, "60".to_string()),
            ]),
        });

        let config = SelectionConfig::default();
        let chosen = select_best_image(fetcher, judge, "apple tart", &[a, b.clone(), c], &config)
            .await
            .expect("a winner");

        // a and b tie at 80; b is larger. c is bigger still but scored below
        // the max, so it never enters the tie-break.
        assert_eq!(chosen, b.to_string());
    }

    #[tokio::test]
    async fn equal_sizes_keep_the_first_encountered() {
        let first = url("https://example.com/first.jpg");
        let second = url("https://example.com/second.jpg");

        let bytes = test_jpeg(50, 50);
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(MapFetcher::new(&[
            (&first, bytes.clone()),
            (&second, bytes),
        ]));
        let judge: Arc<dyn RelevanceJudge> = Arc::new(ConstJudge("70"));

        let config = SelectionConfig::default();
        let chosen = select_best_image(
            fetcher,
            judge,
            "apple tart",
            &[first.clone(), second],
            &config,
        )
        .await
        .expect("a winner");

        assert_eq!(chosen, first.to_string());
    }

    #[tokio::test]
    async fn all_judge_failures_yield_none() {
        let a = url("https://example.com/a.jpg");
        let fetcher: Arc<dyn ImageFetcher> =
            Arc::new(MapFetcher::new(&[(&a, test_jpeg(50, 50))]));
        let judge: Arc<dyn RelevanceJudge> = Arc::new(FailJudge);

        let config = SelectionConfig::default();
        let chosen = select_best_image(fetcher, judge, "apple tart", &[a], &config).await;
        assert_eq!(chosen, None);
    }

    #[tokio::test]
    async fn unparsable_responses_yield_none() {
        let a = url("https://example.com/a.jpg");
        let fetcher: Arc<dyn ImageFetcher> =
            Arc::new(MapFetcher::new(&[(&a, test_jpeg(50, 50))]));
        let judge: Arc<dyn RelevanceJudge> = Arc::new(ConstJudge("probably around 80"));

        let config = SelectionConfig::default();
        let chosen = select_best_image(fetcher, judge, "apple tart", &[a], &config).await;
        assert_eq!(chosen, None);
    }

    #[tokio::test]
    async fn empty_candidate_list_yields_none() {
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(MapFetcher::new(&[]));
        let judge: Arc<dyn RelevanceJudge> = Arc::new(ConstJudge("70"));

        let config = SelectionConfig::default();
        let chosen = select_best_image(fetcher, judge, "apple tart", &[], &config).await;
        assert_eq!(chosen, None);
    }

    #[tokio::test]
    async fn one_failing_candidate_does_not_sink_the_batch() {
        let good = url("https://example.com/good.jpg");
        let missing = url("https://example.com/missing.jpg");

        let fetcher: Arc<dyn ImageFetcher> =
            Arc::new(MapFetcher::new(&[(&good, test_jpeg(50, 50))]));
        let judge: Arc<dyn RelevanceJudge> = Arc::new(ConstJudge("55"));

        let config = SelectionConfig::default();
        let chosen = select_best_image(
            fetcher,
            judge,
            "apple tart",
            &[missing, good.clone()],
            &config,
        )
        .await
        .expect("a winner");

        assert_eq!(chosen, good.to_string());
    }

    #[tokio::test]
    async fn corrupt_image_bytes_drop_only_that_candidate() {
        let good = url("https://example.com/good.jpg");
        let corrupt = url("https://example.com/corrupt.jpg");

        let fetcher: Arc<dyn ImageFetcher> = Arc::new(MapFetcher::new(&[
            (&good, test_jpeg(50, 50)),
            (&corrupt, b"not an image at all".to_vec()),
        ]));
        let judge: Arc<dyn RelevanceJudge> = Arc::new(ConstJudge("55"));

        let config = SelectionConfig::default();
        let chosen = select_best_image(
            fetcher,
            judge,
            "apple tart",
            &[corrupt, good.clone()],
            &config,
        )
        .await
        .expect("a winner");

        assert_eq!(chosen, good.to_string());
    }
}
