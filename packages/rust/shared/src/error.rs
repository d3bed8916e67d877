//! Error types for coverpick.
//!
//! Library crates use [`CoverpickError`] via `thiserror`. Per-candidate
//! failures (fetch, decode, judge) are caught and logged where they occur;
//! they degrade the batch to fewer candidates and never cross the pipeline
//! boundary as errors.

use std::path::PathBuf;

/// Top-level error type for all coverpick operations.
#[derive(Debug, thiserror::Error)]
pub enum CoverpickError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page or image.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing or candidate extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Image decode, resize, or encode error.
    #[error("image error: {0}")]
    Image(String),

    /// Judge call or judge-response error.
    #[error("judge error: {0}")]
    Judge(String),

    /// Data validation error (out-of-range score, invalid URL, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CoverpickError>;

impl CoverpickError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
