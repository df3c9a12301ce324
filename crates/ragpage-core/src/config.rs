use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result, anyhow};

use crate::api::RagClient;
use crate::page::PageMetrics;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment overrides, checked before the config file
pub const ENV_API_URL: &str = "RAGPAGE_API_URL";
pub const ENV_LOG: &str = "RAGPAGE_LOG";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    #[serde(default)]
    pub probe_timeout_secs: Option<u64>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub page: PageConfig,
}

/// Optional overrides for page geometry, in rows
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PageConfig {
    pub shadow_threshold: Option<u16>,
    pub reveal_offset: Option<u16>,
    pub reveal_margin: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            probe_timeout_secs: None,
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            page: PageConfig::default(),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("invalid config file {}", config_path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Apply environment overrides on top of file values
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_url = Some(url);
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = Some(level);
        }
        self
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }

    /// Client for the startup health check. Only this one honors
    /// `probe_timeout_secs`.
    pub fn probe_client(&self) -> Result<RagClient> {
        RagClient::with_timeout(self.api_url(), self.probe_timeout())
    }

    /// Client for `/query`, bounded only by the transport default
    pub fn chat_client(&self) -> RagClient {
        RagClient::new(self.api_url())
    }

    pub fn page_metrics(&self) -> PageMetrics {
        let defaults = PageMetrics::default();
        PageMetrics {
            shadow_threshold: self.page.shadow_threshold.unwrap_or(defaults.shadow_threshold),
            reveal_offset: self.page.reveal_offset.unwrap_or(defaults.reveal_offset),
            reveal_margin: self.page.reveal_margin.unwrap_or(defaults.reveal_margin),
            ..defaults
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ragpage").join("config.json"))
    }
}
