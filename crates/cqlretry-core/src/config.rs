use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{
    MaxRetries, RequestRateMatcher, RetryPolicy, DEFAULT_FIXED_BACKOFF, DEFAULT_HINT_LABEL,
    DEFAULT_SIGNATURE,
};

/// Retry policy parameters (`[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per operation; -1 retries forever.
    pub max_retries: i64,
    /// Base of the exponential fallback, used when the server sends no hint.
    pub fixed_backoff_ms: u64,
    /// Substring that marks a throttling response. Defaults to "Request rate is large".
    pub signature: Option<String>,
    /// Label preceding the server's millisecond hint. Defaults to "RetryAfterMs=".
    pub hint_label: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            fixed_backoff_ms: DEFAULT_FIXED_BACKOFF.as_millis() as u64,
            signature: None,
            hint_label: None,
        }
    }
}

impl RetryConfig {
    pub fn matcher(&self) -> RequestRateMatcher {
        RequestRateMatcher::new(
            self.signature.as_deref().unwrap_or(DEFAULT_SIGNATURE),
            self.hint_label.as_deref().unwrap_or(DEFAULT_HINT_LABEL),
        )
    }

    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
            .with_fixed_backoff(Duration::from_millis(self.fixed_backoff_ms))
            .with_matcher(self.matcher())
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        cfg.to_policy()
    }
}

impl From<MaxRetries> for RetryConfig {
    fn from(max_retries: MaxRetries) -> Self {
        Self {
            max_retries: max_retries.as_raw(),
            ..Self::default()
        }
    }
}

/// Global configuration loaded from `~/.config/cqlretry/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CqlRetryConfig {
    /// Retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: RetryConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cqlretry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CqlRetryConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<CqlRetryConfig> {
    if !path.exists() {
        let default_cfg = CqlRetryConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(path)
}

/// Load configuration from an existing file.
pub fn load_from(path: &Path) -> Result<CqlRetryConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: CqlRetryConfig = toml::from_str(&data)?;
    Ok(cfg)
}
