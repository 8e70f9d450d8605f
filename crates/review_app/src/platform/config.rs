//! Client configuration loaded from `review_client.ron`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use review_core::{RegenerationPolicy, DEFAULT_SEARCH_LIMIT};
use review_engine::ApiSettings;
use review_logging::{review_info, review_warn};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "review_client.ron";
pub const CONFIG_PATH_ENV: &str = "REVIEW_CLIENT_CONFIG";
pub const API_BASE_ENV: &str = "REVIEW_API_BASE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub api_base: String,
    pub chapter_id: String,
    pub grace_secs: u64,
    /// Extra status polls after the first re-fetch while the backend still
    /// reports a requested revision. Zero keeps the single fixed wait.
    pub max_polls: u32,
    pub search_limit: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_image_bytes: u64,
    pub log_destination: LogDestination,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000".to_string(),
            chapter_id: "the_gates_of_morning_book1_chapter1".to_string(),
            grace_secs: 5,
            max_polls: 0,
            search_limit: DEFAULT_SEARCH_LIMIT,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_image_bytes: 10 * 1024 * 1024,
            log_destination: LogDestination::File,
        }
    }
}

impl ReviewConfig {
    /// Loads from `$REVIEW_CLIENT_CONFIG` or `./review_client.ron`, then
    /// applies `$REVIEW_API_BASE`.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
        let mut config = Self::load_from(&path);
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.api_base = base.trim().to_string();
            }
        }
        config
    }

    /// Missing file means defaults. Unreadable or malformed files are logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(err) => {
                review_warn!("Failed to read config from {:?}: {}", path, err);
                return Self::default();
            }
        };

        match ron::from_str(&content) {
            Ok(config) => {
                review_info!("Loaded config from {:?}", path);
                config
            }
            Err(err) => {
                review_warn!("Failed to parse config from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn policy(&self) -> RegenerationPolicy {
        RegenerationPolicy {
            grace: Duration::from_secs(self.grace_secs),
            max_polls: self.max_polls,
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_image_bytes: self.max_image_bytes,
        }
    }
}
