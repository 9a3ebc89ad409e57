//! Persistent snapshot storage.
//!
//! A snapshot is the complete working set written at the end of a full
//! crawl, so the next session can skip re-crawling.
//!
//! ## Snapshot Layout
//!
//! ```text
//! {
//!   "schema_version": 1,
//!   "timestamp": "2026-10-19T08:00:00Z",
//!   "checksum": "<sha256 of the movie array>",
//!   "metadata": { "total_movies": 24000, "categories": [...], ... },
//!   "movies": [ ... ]
//! }
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::index::FacetSets;
use crate::models::MovieRecord;

// Re-export for convenience
pub use local::LocalSnapshotStore;
pub use memory::MemorySnapshotStore;

/// Current on-disk format version.
pub const SCHEMA_VERSION: u32 = 1;

/// Counts stored next to the movies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub total_movies: usize,
    pub categories: Vec<String>,
    pub countries: Vec<String>,
    pub years: Vec<i64>,
    pub pages_crawled: usize,
}

impl SnapshotMetadata {
    pub fn new(total_movies: usize, facets: &FacetSets, pages_crawled: usize) -> Self {
        Self {
            total_movies,
            categories: facets.categories.iter().cloned().collect(),
            countries: facets.countries.iter().cloned().collect(),
            years: facets.years_desc(),
            pages_crawled,
        }
    }
}

/// Durable copy of a fully crawled working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub schema_version: u32,
    pub timestamp: DateTime<Utc>,
    pub checksum: String,
    pub metadata: SnapshotMetadata,
    pub movies: Vec<MovieRecord>,
}

impl PersistedSnapshot {
    /// Check format version and checksum.
    pub fn verify(&self, name: &str) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(AppError::corrupt(
                name,
                format!(
                    "schema version {} (expected {})",
                    self.schema_version, SCHEMA_VERSION
                ),
            ));
        }
        if movies_checksum(&self.movies)? != self.checksum {
            return Err(AppError::corrupt(name, "checksum mismatch"));
        }
        Ok(())
    }

    /// Seconds since the snapshot was written.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.timestamp).num_seconds().max(0)
    }
}

/// Borrowed form of [`PersistedSnapshot`] used for writing.
#[derive(Debug, Serialize)]
pub(crate) struct SnapshotRef<'a> {
    pub schema_version: u32,
    pub timestamp: DateTime<Utc>,
    pub checksum: String,
    pub metadata: &'a SnapshotMetadata,
    pub movies: &'a [MovieRecord],
}

impl<'a> SnapshotRef<'a> {
    pub fn new(movies: &'a [MovieRecord], metadata: &'a SnapshotMetadata) -> Result<Self> {
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            timestamp: Utc::now(),
            checksum: movies_checksum(movies)?,
            metadata,
            movies,
        })
    }
}

/// Summary of a stored snapshot without its movies.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    pub total_movies: usize,
    pub timestamp: DateTime<Utc>,
}

/// Hex SHA-256 of the compact JSON encoding of `movies`.
pub fn movies_checksum(movies: &[MovieRecord]) -> Result<String> {
    let bytes = serde_json::to_vec(movies)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load and verify a snapshot; `None` when there is none.
    async fn load(&self, name: &str) -> Result<Option<PersistedSnapshot>>;

    /// Write a snapshot, replacing any previous one under `name`.
    async fn save(
        &self,
        name: &str,
        movies: &[MovieRecord],
        metadata: &SnapshotMetadata,
    ) -> Result<DateTime<Utc>>;

    /// Delete every stored snapshot.
    async fn clear_all(&self) -> Result<()>;

    /// Snapshot summary; the default implementation loads the full snapshot.
    async fn info(&self, name: &str) -> Result<Option<SnapshotInfo>> {
        Ok(self.load(name).await?.map(|s| SnapshotInfo {
            total_movies: s.movies.len(),
            timestamp: s.timestamp,
        }))
    }
}
