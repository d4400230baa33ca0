use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::FlushPolicy;
use crate::storage::persistence::DEFAULT_NAMESPACE;
use crate::ui::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";
pub const DEFAULT_DATABASE_PATH: &str = "data/chat.db";
pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all?fields=name,idd,flags";

/// Latency of the simulated services, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// OTP send/verify and image upload
    pub latency_ms: u64,
    /// Minimum assistant reply delay; up to `reply_jitter_ms` is added at random
    pub reply_delay_ms: u64,
    pub reply_jitter_ms: u64,
    pub countries_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            latency_ms: 1000,
            reply_delay_ms: 2000,
            reply_jitter_ms: 3000,
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            request_timeout_ms: 5000,
        }
    }
}

impl ApiConfig {
    /// No artificial delays; used by tests.
    pub fn instant() -> Self {
        Self {
            latency_ms: 0,
            reply_delay_ms: 0,
            reply_jitter_ms: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub namespace: String,
    pub page_size: usize,
    pub flush_policy: FlushPolicy,
    pub api: ApiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            namespace: DEFAULT_NAMESPACE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            flush_policy: FlushPolicy::default(),
            api: ApiConfig::default(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    crate::storage::ensure_parent_dir(Path::new(path))?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

/// Writes the effective config (file plus CLI overrides) back to `path`.
pub fn persist_config(path: &str, config: &AppConfig) {
    if let Err(err) = save_config(path, config) {
        log::error!("Failed to write config {path}: {err}");
    } else {
        log::info!("Persisted config to {path}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.json");
        fs::write(&path, r#"{ "page_size": 5, "api": { "latency_ms": 0 } }"#).unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.page_size, 5);
        assert_eq!(config.api.latency_ms, 0);
        assert_eq!(config.api.reply_delay_ms, 2000);
        assert_eq!(config.flush_policy, FlushPolicy::EveryMutation);
    }

    #[test]
    fn broken_or_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ nope").unwrap();

        assert_eq!(load_config(path.to_str().unwrap()), AppConfig::default());
        assert_eq!(
            load_config(dir.path().join("missing.json").to_str().unwrap()),
            AppConfig::default()
        );
    }

    #[test]
    fn persisted_overrides_are_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/chat.json");
        let path = path.to_str().unwrap();

        let mut config = load_config(path);
        config.page_size = 7;
        config.flush_policy = FlushPolicy::OnExit;
        persist_config(path, &config);

        let reloaded = load_config(path);
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.api, ApiConfig::default());
    }
}
