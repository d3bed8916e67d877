//! Heuristic image-candidate extraction from a parsed HTML document.
//!
//! Candidates are scored purely from DOM layout context (placement, caption,
//! surrounding text, declared dimensions); pixel content is never inspected
//! here. The aggregator later folds probed sizes into the ranking.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use coverpick_shared::ImageCandidate;

/// Page furniture that must never produce candidates. The exclusion covers
/// the matched element and its entire subtree.
static BOILERPLATE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "nav, aside, footer, header, .sidebar, .related, .recommend, .promo, .ads, .comments",
    )
    .expect("boilerplate selector")
});

static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("img selector"));

static FIGCAPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("figcaption").expect("figcaption selector"));

/// Near-certain non-content images, matched against alt text + class list.
static NON_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i)avatar|icon|logo").expect("non-content pattern"));

/// `near_text` is truncated to this many characters.
const NEAR_TEXT_MAX_CHARS: usize = 300;

/// Surrounding paragraphs longer than this indicate a content image.
const NEAR_TEXT_SCORE_LEN: usize = 120;

/// Declared width×height above this counts as a large image.
const BIG_DIMENSION_PRODUCT: u64 = 300_000;

/// Extract scored image candidates from a parsed document, best first.
///
/// `position` is 1-based document order among enumerated `<img>` elements and
/// advances even for elements rejected for a missing `src` or a non-content
/// alt/class; only boilerplate subtrees are invisible to the counter.
/// The sort is stable: equal scores keep encounter order.
pub fn extract_image_candidates(doc: &Html) -> Vec<ImageCandidate> {
    let mut candidates = Vec::new();
    let mut position = 0usize;

    for img in doc.select(&IMG) {
        if in_boilerplate(&img) {
            continue;
        }
        position += 1;

        let src = match img.value().attr("src") {
            Some(src) if !src.trim().is_empty() => src,
            _ => continue,
        };

        let alt = img.value().attr("alt").unwrap_or("").to_lowercase();
        let classes = img
            .value()
            .classes()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if NON_CONTENT.is_match(&format!("{alt} {classes}")) {
            continue;
        }

        let in_article = img
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| matches!(el.value().name(), "article" | "main" | "figure"));

        let caption = figure_caption(&img).unwrap_or_default();
        let near_text = truncate_chars(&nearest_paragraph_text(&img), NEAR_TEXT_MAX_CHARS);

        let mut score = 0u32;
        if in_article {
            score += 3;
        }
        if !caption.is_empty() {
            score += 2;
        }
        if near_text.chars().count() > NEAR_TEXT_SCORE_LEN {
            score += 2;
        }
        if declared_area(&img) > BIG_DIMENSION_PRODUCT {
            score += 2;
        }

        candidates.push(ImageCandidate {
            src: src.to_string(),
            alt,
            caption,
            near_text,
            position,
            score,
        });
    }

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

/// Whether the element or any of its ancestors matches the boilerplate set.
fn in_boilerplate(img: &ElementRef<'_>) -> bool {
    if BOILERPLATE.matches(img) {
        return true;
    }
    img.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| BOILERPLATE.matches(&el))
}

/// Trimmed `<figcaption>` text when the immediate parent is a `<figure>`.
fn figure_caption(img: &ElementRef<'_>) -> Option<String> {
    let parent = img.parent().and_then(ElementRef::wrap)?;
    if parent.value().name() != "figure" {
        return None;
    }
    let figcaption = parent.select(&FIGCAPTION).next()?;
    Some(figcaption.text().collect::<String>().trim().to_string())
}

/// Trimmed text of the nearest `<p>` ancestor, empty if there is none.
fn nearest_paragraph_text(img: &ElementRef<'_>) -> String {
    img.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "p")
        .map(|p| p.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Product of the declared `width`/`height` attributes; zero when either is
/// missing or non-numeric (never an error).
fn declared_area(img: &ElementRef<'_>) -> u64 {
    let parse = |name: &str| -> Option<u64> { img.value().attr(name)?.trim().parse().ok() };
    match (parse("width"), parse("height")) {
        (Some(w), Some(h)) => w.saturating_mul(h),
        _ => 0,
    }
}

/// Character-boundary-safe prefix truncation.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
