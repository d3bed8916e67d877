//! Bounded-width JPEG normalization for judge submissions.
//!
//! Candidates are downsized to a narrow bound and flattened to plain color
//! JPEG before upload; the judge only needs enough detail to rate relevance.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use coverpick_shared::{CoverpickError, Result};

/// Encoding quality for judge submissions.
const JPEG_QUALITY: u8 = 95;

/// Normalize raw image bytes to a JPEG no wider than `max_width`.
///
/// Alpha and palette images are flattened to RGB. Inputs already within the
/// bound are re-encoded without resizing; wider inputs are scaled
/// proportionally with Lanczos3, height rounded to the nearest integer.
/// Malformed input returns an error, which callers isolate per candidate.
pub fn resize_for_judging(bytes: &[u8], max_width: u32) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CoverpickError::Image(format!("decode failed: {e}")))?;

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let rgb = if width <= max_width {
        rgb
    } else {
        let ratio = f64::from(max_width) / f64::from(width);
        let new_height = (f64::from(height) * ratio).round().max(1.0) as u32;
        image::imageops::resize(&rgb, max_width, new_height, FilterType::Lanczos3)
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| CoverpickError::Image(format!("encode failed: {e}")))?;

    Ok(out)
}
