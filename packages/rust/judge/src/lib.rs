//! Multimodal judge collaborator for image relevance rating.
//!
//! This crate provides:
//! - [`RelevanceJudge`] — the async judging seam injected into the selector
//!   (mockable in tests)
//! - [`OpenAiJudge`] — an OpenAI-compatible chat-completions implementation
//! - [`parse_percentage`] — strict parsing of the judge's 0–100 answer
//! - [`relevance_prompt`] — the standardized judging prompt

pub mod openai;
pub mod parse;
pub mod prompt;

use async_trait::async_trait;

use coverpick_shared::Result;

pub use openai::OpenAiJudge;
pub use parse::parse_percentage;
pub use prompt::relevance_prompt;

/// A vision-capable model that rates an image against a text prompt.
///
/// Implementations return the model's raw text response; callers parse it
/// with [`parse_percentage`] and treat unparsable output as a per-candidate
/// failure.
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    /// Submit one prompt + JPEG image pair and return the response text.
    async fn judge(&self, prompt: &str, image_jpeg: &[u8]) -> Result<String>;
}
