//! Client configuration.
//!
//! Values are layered: defaults, then `<config_dir>/windwalker/config.json`
//! if present, then environment variables:
//! - `WINDWALKER_URL` - data service root (default: `http://127.0.0.1:8080`)
//! - `WINDWALKER_DEBOUNCE_MS` - search debounce window
//! - `WINDWALKER_PLAYBACK_MS` - playback tick period
//! - `WINDWALKER_TIMEOUT_SECS` - HTTP request timeout

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "windwalker";
const CONFIG_FILE: &str = "config.json";

/// Default URL for a locally running data service.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Quiet period after the last keystroke before a search is issued.
    pub debounce_ms: u64,
    /// Period of the playback timer.
    pub playback_period_ms: u64,
    /// Queries shorter than this (in characters) never reach the service.
    pub min_query_len: usize,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            debounce_ms: 300,
            playback_period_ms: 500,
            min_query_len: 2,
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load from the user config file and environment.
    /// Falls back to defaults if the file is missing or fails to parse.
    pub fn load() -> Self {
        let mut config = match default_config_path() {
            Some(path) => Self::from_file(&path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }),
            None => Self::default(),
        };
        if let Err(e) = config.apply_env() {
            tracing::warn!("Ignoring environment override: {}", e);
        }
        config
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write this configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply `WINDWALKER_*` environment overrides.
    ///
    /// Every valid variable is applied; the first invalid one is reported.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let mut first_error = None;

        if let Some(url) = var("WINDWALKER_URL") {
            self.base_url = url;
        }
        for (key, slot) in [
            ("WINDWALKER_DEBOUNCE_MS", &mut self.debounce_ms),
            ("WINDWALKER_PLAYBACK_MS", &mut self.playback_period_ms),
            ("WINDWALKER_TIMEOUT_SECS", &mut self.request_timeout_secs),
        ] {
            let Some(value) = var(key) else { continue };
            match value.trim().parse::<u64>() {
                Ok(parsed) => *slot = parsed,
                Err(_) => {
                    first_error.get_or_insert(ConfigError::InvalidEnv { key, value });
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn playback_period(&self) -> Duration {
        Duration::from_millis(self.playback_period_ms.max(1))
    }
}

/// `<config_dir>/windwalker/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Some(path)
}
