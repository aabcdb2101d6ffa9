//! Configuration infrastructure
//!
//! Scraper tuning and logging settings, persisted as JSON in the user's
//! configuration directory. Missing sections and fields fall back to the
//! values in [`defaults`].

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::Store;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub logging: LoggingConfig,
}

/// Settings read by the aggregator and every store adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Cap on accepted records per store
    pub max_results_per_store: usize,

    /// Stores queried at the same time
    pub max_concurrent_stores: usize,

    /// Wall-clock bound on a whole search, in seconds
    pub search_timeout_seconds: u64,

    /// Honour per-store courtesy pauses (Atlhetica, Probiótica)
    pub courtesy_delay_enabled: bool,

    /// Image used when a listing card has none
    pub placeholder_image_url: String,

    /// User agents rotated across requests
    pub user_agents: Vec<String>,

    pub accept_language: String,

    pub max_redirects: usize,

    /// Stores queried by a search, in dispatch order
    pub enabled_stores: Vec<Store>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_results_per_store: defaults::MAX_RESULTS_PER_STORE,
            max_concurrent_stores: defaults::MAX_CONCURRENT_STORES,
            search_timeout_seconds: defaults::SEARCH_TIMEOUT_SECONDS,
            courtesy_delay_enabled: defaults::COURTESY_DELAY_ENABLED,
            placeholder_image_url: defaults::PLACEHOLDER_IMAGE_URL.to_string(),
            user_agents: defaults::USER_AGENTS.iter().map(|s| (*s).to_string()).collect(),
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            max_redirects: defaults::MAX_REDIRECTS,
            enabled_stores: Store::ALL.to_vec(),
        }
    }
}

impl ScraperConfig {
    /// Reject settings the aggregator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_stores == 0 {
            bail!("max_concurrent_stores must be at least 1");
        }
        if self.search_timeout_seconds == 0 {
            bail!("search_timeout_seconds must be at least 1");
        }
        if self.user_agents.iter().all(|agent| agent.trim().is_empty()) {
            bail!("user_agents must contain at least one user agent");
        }
        if self.placeholder_image_url.trim().is_empty() {
            bail!("placeholder_image_url must not be empty");
        }
        Ok(())
    }

    pub fn is_enabled(&self, store: Store) -> bool {
        self.enabled_stores.contains(&store)
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs in the log file
    pub json_format: bool,

    /// Enable console output (stderr)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` under the app data directory
    pub log_dir: Option<PathBuf>,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(data_dir)
    }

    /// Configuration manager for the default location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration parse error: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                self.reset_to_defaults().await
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Update scraper settings in place
    pub async fn update_scraper_config<F>(&self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut ScraperConfig),
    {
        let mut config = self.load_config().await?;
        updater(&mut config.scraper);
        config.scraper.validate()?;
        self.save_config(&config).await
    }

    /// Reset configuration to defaults (useful for troubleshooting)
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        info!("🔄 Resetting configuration to defaults");

        let default_config = AppConfig::default();
        self.save_config(&default_config)
            .await
            .context("Failed to save default configuration")?;

        Ok(default_config)
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "supplement-scout";

    pub const CONFIG_FILE_NAME: &str = "supplement_scout_config.json";

    pub const MAX_RESULTS_PER_STORE: usize = 5;

    pub const MAX_CONCURRENT_STORES: usize = 4;

    pub const SEARCH_TIMEOUT_SECONDS: u64 = 60;

    pub const COURTESY_DELAY_ENABLED: bool = true;

    pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150";

    pub const ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7";

    pub const MAX_REDIRECTS: usize = 5;

    /// Desktop browser user agents rotated across requests
    pub const USER_AGENTS: &[&str] = &[
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.5615.138 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.4 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36 Edg/113.0.0.0",
    ];

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;

    pub const LOG_MAX_FILES: u32 = 5;

    pub const LOG_AUTO_CLEANUP: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_scraper_config_is_valid() {
        let config = ScraperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.enabled_stores.len(), 12);
        assert_eq!(config.user_agents.len(), 4);
        assert_eq!(config.max_results_per_store, 5);
    }

    #[test]
    fn test_validation_rejects_unusable_settings() {
        let mut config = ScraperConfig::default();
        config.max_concurrent_stores = 0;
        assert!(config.validate().is_err());

        let mut config = ScraperConfig::default();
        config.search_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = ScraperConfig::default();
        config.user_agents = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let json = r#"{ "scraper": { "max_results_per_store": 3, "enabled_stores": ["Amazon", "Panvel"] } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.scraper.max_results_per_store, 3);
        assert_eq!(config.scraper.enabled_stores, vec![Store::Amazon, Store::Panvel]);
        assert_eq!(config.scraper.max_concurrent_stores, defaults::MAX_CONCURRENT_STORES);
        assert_eq!(config.logging.level, defaults::LOG_LEVEL);
    }

    #[tokio::test]
    async fn test_first_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join(defaults::CONFIG_FILE_NAME));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.scraper.search_timeout_seconds, defaults::SEARCH_TIMEOUT_SECONDS);
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn test_save_and_update_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join(defaults::CONFIG_FILE_NAME));

        manager
            .update_scraper_config(|scraper| {
                scraper.courtesy_delay_enabled = false;
                scraper.enabled_stores = vec![Store::Netshoes];
            })
            .await
            .unwrap();

        let reloaded = manager.load_config().await.unwrap();
        assert!(!reloaded.scraper.courtesy_delay_enabled);
        assert_eq!(reloaded.scraper.enabled_stores, vec![Store::Netshoes]);
    }

    #[tokio::test]
    async fn test_invalid_update_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join(defaults::CONFIG_FILE_NAME));

        let result = manager
            .update_scraper_config(|scraper| scraper.max_concurrent_stores = 0)
            .await;
        assert!(result.is_err());

        let reloaded = manager.load_config().await.unwrap();
        assert_eq!(reloaded.scraper.max_concurrent_stores, defaults::MAX_CONCURRENT_STORES);
    }

    #[tokio::test]
    async fn test_corrupted_file_is_backed_up_and_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(defaults::CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::with_path(&path);
        let config = manager.load_config().await.unwrap();

        assert_eq!(config.scraper.max_results_per_store, defaults::MAX_RESULTS_PER_STORE);
        let backup = dir.path().join("supplement_scout_config.json.corrupted");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "{ not json");
    }
}
