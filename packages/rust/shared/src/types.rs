//! Core domain types for image candidate selection.
//!
//! All of these are ephemeral: they live for one selection batch and are
//! never persisted. The only durable artifact downstream is the winning URL,
//! which the caller writes onto its own article record.

use serde::{Deserialize, Serialize};

/// An image found in a source page, with the layout context used for scoring.
///
/// Produced per page by the extractor. `position` is the 1-based document
/// order among enumerated `<img>` elements (it advances even for elements
/// later rejected); `score` is the additive layout score and is only
/// comparable to other candidates from the same page until the aggregator
/// re-scores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Raw `src` attribute, possibly site-relative.
    pub src: String,
    /// Lower-cased `alt` text (empty if absent).
    pub alt: String,
    /// Trimmed `<figcaption>` text when the image sits in a `<figure>`.
    pub caption: String,
    /// Trimmed text of the nearest `<p>` ancestor, truncated to 300 chars.
    pub near_text: String,
    /// 1-based position in document order among enumerated images.
    pub position: usize,
    /// Additive layout score (in-article, caption, near-text, dimensions).
    pub score: u32,
}

/// A candidate that survived URL resolution and the size probe.
///
/// `score` folds the probed byte size into the layout score
/// (`layout + size_bytes / divisor`); candidates from different pages are
/// concatenated without re-normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredImage {
    /// The extracted candidate this score was derived from.
    pub candidate: ImageCandidate,
    /// Absolute URL, resolved against the originating page.
    pub resolved_src: String,
    /// Probed size in bytes.
    pub size_bytes: u64,
    /// Combined ranking score.
    pub score: u64,
}

/// One judged candidate: the vision model's relevance percentage for a URL.
///
/// At most one per candidate that did not fail to download, resize, or judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgedImage {
    /// Relevance percentage, 0–100.
    pub percentage: u8,
    /// The candidate URL that was judged.
    pub source_url: String,
}
