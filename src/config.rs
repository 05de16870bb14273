//! Configuration management for goes-browse using the prefer crate.

use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_SEARCH_LIMIT;
use crate::render::DEFAULT_ASSET_ROOT;

/// Default site the client talks to.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Site origin; API routes and deep links are built under it.
    pub base_url: String,
    /// Prefix for relative image paths (a path or a full URL).
    pub asset_root: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Page size for interactive searches.
    pub search_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            asset_root: DEFAULT_ASSET_ROOT.to_string(),
            user_agent: concat!("goes-browse/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: 30,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub asset_root: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    #[serde(default)]
    pub search_limit: Option<u32>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers goes-browse config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("goes-browse").await {
            Ok(pref_config) => {
                let base_url: Option<String> = pref_config.get("base_url").ok();
                let asset_root: Option<String> = pref_config.get("asset_root").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let search_limit: Option<u32> = pref_config.get("search_limit").ok();

                Config {
                    base_url,
                    asset_root,
                    user_agent,
                    request_timeout,
                    search_limit,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ref asset_root) = self.asset_root {
            settings.asset_root = asset_root.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        // A zero page size would make every search empty.
        if let Some(limit) = self.search_limit.filter(|l| *l > 0) {
            settings.search_limit = limit;
        }
    }
}

/// Load settings from configuration (async version).
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}
