//! HTML image extraction and candidate aggregation.
//!
//! This crate provides:
//! - [`extractor`] — boilerplate-aware `<img>` enumeration with heuristic
//!   layout scoring
//! - [`aggregator`] — size probing, floor filtering, re-scoring, and
//!   multi-page merging

pub mod aggregator;
pub mod extractor;

pub use aggregator::{gather_candidates, score_page_images};
pub use extractor::extract_image_candidates;
