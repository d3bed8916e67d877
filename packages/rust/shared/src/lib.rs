//! Shared types, error model, and configuration for coverpick.
//!
//! This crate is the foundation depended on by all other coverpick crates.
//! It provides:
//! - [`CoverpickError`] — the unified error type
//! - Domain types ([`ImageCandidate`], [`ScoredImage`], [`JudgedImage`])
//! - Configuration ([`AppConfig`], [`SelectionConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, JudgeApiConfig, SelectionConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_api_key,
};
pub use error::{CoverpickError, Result};
pub use types::{ImageCandidate, JudgedImage, ScoredImage};
