//! Application configuration for coverpick.
//!
//! User config lives at `~/.coverpick/coverpick.toml`. Embedding pipelines
//! override config file values programmatically; the file overrides defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoverpickError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "coverpick.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".coverpick";

// ---------------------------------------------------------------------------
// Config structs (matching coverpick.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Candidate filtering and ranking thresholds.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Vision judge API settings.
    #[serde(default)]
    pub judge: JudgeApiConfig,
}

/// `[selection]` section: thresholds for filtering, ranking, and fan-out.
///
/// The size metric is byte length everywhere: the floor, the bonus divisor,
/// and the tie-break probe all measure the same thing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Candidates probing below this many bytes are discarded as
    /// thumbnails/trackers.
    #[serde(default = "default_min_image_bytes")]
    pub min_image_bytes: u64,

    /// Ranking bonus is `size_bytes / size_bonus_divisor`, added to the
    /// layout score.
    #[serde(default = "default_size_bonus_divisor")]
    pub size_bonus_divisor: u64,

    /// How many of a page's top-ranked candidates are passed to the judge.
    #[serde(default = "default_max_judged_per_page")]
    pub max_judged_per_page: usize,

    /// Width bound for images submitted to the judge.
    #[serde(default = "default_judge_image_width")]
    pub judge_image_width: u32,

    /// Per-call HTTP timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum concurrent judge round trips.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_image_bytes: default_min_image_bytes(),
            size_bonus_divisor: default_size_bonus_divisor(),
            max_judged_per_page: default_max_judged_per_page(),
            judge_image_width: default_judge_image_width(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_min_image_bytes() -> u64 {
    1200
}
fn default_size_bonus_divisor() -> u64 {
    1000
}
fn default_max_judged_per_page() -> usize {
    4
}
fn default_judge_image_width() -> u32 {
    200
}
fn default_fetch_timeout_secs() -> u64 {
    20
}
fn default_concurrency() -> usize {
    4
}

/// `[judge]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeApiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Vision-capable model to use for judging.
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat-completions endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Maximum tokens in a judge response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for JudgeApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            api_url: default_api_url(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn default_max_tokens() -> u32 {
    800
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.coverpick/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CoverpickError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.coverpick/coverpick.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CoverpickError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CoverpickError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CoverpickError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CoverpickError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CoverpickError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the judge API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.judge.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(CoverpickError::config(format!(
            "judge API key not found. Set the {var_name} environment variable."
        ))),
    }
}
