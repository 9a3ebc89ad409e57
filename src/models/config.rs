//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote movie API settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Preload and crawl behavior
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Query result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Persistent snapshot settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Search-box behavior
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(AppError::validation("source.base_url is empty"));
        }
        url::Url::parse(&self.source.base_url)
            .map_err(|e| AppError::validation(format!("source.base_url is invalid: {e}")))?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.sort_param.trim().is_empty() || self.source.sort_type_param.trim().is_empty()
        {
            return Err(AppError::validation("source sort parameter names are empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.loader.batch_size == 0 {
            return Err(AppError::validation("loader.batch_size must be > 0"));
        }
        if self.loader.estimated_total_pages == 0 {
            return Err(AppError::validation(
                "loader.estimated_total_pages must be > 0",
            ));
        }
        if self.loader.max_consecutive_empty == 0 {
            return Err(AppError::validation(
                "loader.max_consecutive_empty must be > 0",
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(AppError::validation("cache.max_entries must be > 0"));
        }
        if self.storage.snapshot_name.trim().is_empty() {
            return Err(AppError::validation("storage.snapshot_name is empty"));
        }
        Ok(())
    }
}

/// Remote movie API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// API root, without trailing slash
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the "latest movies" listing, paginated with `?page=N`
    #[serde(default = "defaults::latest_path")]
    pub latest_path: String,

    /// Prefix of the advanced-search list endpoint (`{prefix}/{listSlug}`)
    #[serde(default = "defaults::list_path")]
    pub list_path: String,

    /// Query parameter carrying the list sort field
    #[serde(default = "defaults::sort_param")]
    pub sort_param: String,

    /// Query parameter carrying the list sort direction
    #[serde(default = "defaults::sort_type_param")]
    pub sort_type_param: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            latest_path: defaults::latest_path(),
            list_path: defaults::list_path(),
            sort_param: defaults::sort_param(),
            sort_type_param: defaults::sort_type_param(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Preload and crawl behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Pages fetched on a cold start without full-database mode
    #[serde(default = "defaults::quick_preload_pages")]
    pub quick_preload_pages: usize,

    /// Pages fetched by an extended query, right after the preload window
    #[serde(default = "defaults::extended_pages")]
    pub extended_pages: usize,

    /// Pages fetched concurrently per crawl batch
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Progress denominator and upper bound on crawled pages
    #[serde(default = "defaults::estimated_total_pages")]
    pub estimated_total_pages: usize,

    /// Consecutive empty pages that stop a crawl
    #[serde(default = "defaults::max_consecutive_empty")]
    pub max_consecutive_empty: usize,

    /// Delay between crawl batches in milliseconds
    #[serde(default)]
    pub batch_delay_ms: u64,
}

impl LoaderConfig {
    /// First page of the extended-query window.
    pub fn extended_start_page(&self) -> usize {
        self.quick_preload_pages + 1
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            quick_preload_pages: defaults::quick_preload_pages(),
            extended_pages: defaults::extended_pages(),
            batch_size: defaults::batch_size(),
            estimated_total_pages: defaults::estimated_total_pages(),
            max_consecutive_empty: defaults::max_consecutive_empty(),
            batch_delay_ms: 0,
        }
    }
}

/// Query result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for instant and extended results
    #[serde(default = "defaults::instant_ttl")]
    pub instant_ttl_secs: u64,

    /// TTL for full-database results
    #[serde(default = "defaults::full_ttl")]
    pub full_ttl_secs: u64,

    /// Maximum number of cached results
    #[serde(default = "defaults::max_entries")]
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn instant_ttl(&self) -> Duration {
        Duration::from_secs(self.instant_ttl_secs)
    }

    pub fn full_ttl(&self) -> Duration {
        Duration::from_secs(self.full_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            instant_ttl_secs: defaults::instant_ttl(),
            full_ttl_secs: defaults::full_ttl(),
            max_entries: defaults::max_entries(),
        }
    }
}

/// Persistent snapshot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding snapshot files
    #[serde(default = "defaults::storage_dir")]
    pub dir: String,

    /// Snapshot name (file stem)
    #[serde(default = "defaults::snapshot_name")]
    pub snapshot_name: String,

    /// Snapshots older than this are ignored; unset means they never expire
    #[serde(default)]
    pub max_snapshot_age_hours: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
            snapshot_name: defaults::snapshot_name(),
            max_snapshot_age_hours: None,
        }
    }
}

/// Search-box behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Keystroke debounce before a query is issued
    #[serde(default = "defaults::debounce")]
    pub debounce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: defaults::debounce(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn base_url() -> String {
        "https://phimapi.com".into()
    }
    pub fn latest_path() -> String {
        "/new".into()
    }
    pub fn list_path() -> String {
        "/v1/api/danh-sach".into()
    }
    pub fn sort_param() -> String {
        "sort".into()
    }
    pub fn sort_type_param() -> String {
        "sortType".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; phim-search/0.1)".into()
    }
    pub fn timeout() -> u64 {
        15
    }

    // Loader defaults
    pub fn quick_preload_pages() -> usize {
        10
    }
    pub fn extended_pages() -> usize {
        20
    }
    pub fn batch_size() -> usize {
        10
    }
    pub fn estimated_total_pages() -> usize {
        1000
    }
    pub fn max_consecutive_empty() -> usize {
        5
    }

    // Cache defaults
    pub fn instant_ttl() -> u64 {
        3 * 60
    }
    pub fn full_ttl() -> u64 {
        10 * 60
    }
    pub fn max_entries() -> usize {
        256
    }

    // Storage defaults
    pub fn storage_dir() -> String {
        "storage".into()
    }
    pub fn snapshot_name() -> String {
        "movie-database".into()
    }

    pub fn debounce() -> u64 {
        300
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.loader.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.source.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [source]
            base_url = "http://localhost:8080"

            [loader]
            batch_size = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.source.base_url, "http://localhost:8080");
        assert_eq!(config.source.latest_path, "/new");
        assert_eq!(config.source.sort_param, "sort");
        assert_eq!(config.source.sort_type_param, "sortType");
        assert_eq!(config.loader.batch_size, 4);
        assert_eq!(config.loader.quick_preload_pages, 10);
        assert_eq!(config.loader.extended_start_page(), 11);
        assert_eq!(config.cache.instant_ttl(), Duration::from_secs(180));
        assert_eq!(config.cache.full_ttl(), Duration::from_secs(600));
        assert!(config.storage.max_snapshot_age_hours.is_none());
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(Config::load("/nonexistent/config.toml").is_err());
    }
}
