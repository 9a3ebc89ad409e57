//! Status reports returned by the loader and the service facade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Crawl progress, reported once per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingProgress {
    /// Pages processed so far, capped at `total`
    pub current: usize,
    /// Estimated total page count
    pub total: usize,
    /// 0..=100
    pub percentage: u8,
}

impl LoadingProgress {
    pub fn new(current: usize, total: usize) -> Self {
        let current = current.min(total);
        let percentage = if total == 0 {
            100
        } else {
            ((current as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            current,
            total,
            percentage,
        }
    }
}

/// How the working set was last populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrigin {
    /// Nothing loaded yet (or after a reset)
    Empty,
    Cache,
    QuickPreload,
    FullCrawl,
}

/// Outcome of an initialization or full-crawl run.
///
/// Loader operations never return errors; failures show up in `error`
/// with zeroed counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub origin: LoadOrigin,
    pub total_movies: usize,
    pub from_cache: bool,
    /// Age of the snapshot in seconds when loaded from cache
    pub cache_age_secs: Option<i64>,
    /// Remote pages requested during this run
    pub pages_fetched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadReport {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            origin: LoadOrigin::Empty,
            total_movies: 0,
            from_cache: false,
            cache_age_secs: None,
            pages_fetched: 0,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Snapshot of the index contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_movies: usize,
    pub categories: Vec<String>,
    pub countries: Vec<String>,
    pub years: Vec<i64>,
    pub origin: LoadOrigin,
    pub is_full_database: bool,
    pub loaded_at: Option<DateTime<Utc>>,
    pub query_cache_entries: usize,
}

/// Persistent snapshot and in-memory cache state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub has_snapshot: bool,
    pub snapshot_movies: usize,
    pub snapshot_timestamp: Option<DateTime<Utc>>,
    pub snapshot_age_secs: Option<i64>,
    pub working_set_size: usize,
    pub query_cache_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_caps_current() {
        let progress = LoadingProgress::new(1010, 1000);
        assert_eq!(progress.current, 1000);
        assert_eq!(progress.percentage, 100);
    }

    #[test]
    fn test_progress_percentage_rounds() {
        assert_eq!(LoadingProgress::new(10, 1000).percentage, 1);
        assert_eq!(LoadingProgress::new(5, 1000).percentage, 1);
        assert_eq!(LoadingProgress::new(0, 1000).percentage, 0);
        assert_eq!(LoadingProgress::new(0, 0).percentage, 100);
    }
}
