//! Application configuration.
//!
//! Read from the TOML file named by `NEWS_PAYOUT_CONFIG`, else from
//! `news-payout.toml` in the working directory when it exists, else built
//! from defaults. A handful of environment variables override the file so
//! credentials never have to be written to disk.

use crate::store::StalePolicy;
use crate::types::{FetchConfig, NewsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "NEWS_PAYOUT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "news-payout.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub news_api: FetchConfig,
    pub dashboard: DashboardConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Search term the dashboard opens with.
    pub default_query: String,
    pub debounce_ms: u64,
    pub stale_responses: StalePolicy,
    /// Where exported reports are written.
    pub export_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_query: "tesla".to_string(),
            debounce_ms: 500,
            stale_responses: StalePolicy::Discard,
            export_dir: PathBuf::from("."),
        }
    }
}

impl DashboardConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub base_url: String,
    pub api_key: String,
    /// Callback URI sent along with federated credentials.
    pub request_uri: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: "https://identitytoolkit.googleapis.com/v1/".to_string(),
            api_key: String::new(),
            request_uri: "http://localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Session file; the platform data directory when unset.
    pub session_path: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve the config file (explicit path, then env, then default
    /// file) and apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let mut cfg = match path {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };

        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let cfg = Self::from_toml(&text)
            .map_err(|e| NewsError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var("NEWS_API_KEY") {
            self.news_api.api_key = key;
        }
        if let Ok(base) = env::var("NEWS_API_BASE_URL") {
            self.news_api.base_url = base;
        }
        if let Ok(key) = env::var("FIREBASE_API_KEY") {
            self.identity.api_key = key;
        }
        if let Ok(path) = env::var("NEWS_PAYOUT_SESSION") {
            self.storage.session_path = Some(PathBuf::from(path));
        }
    }
}
