// src/pipeline/loader.rs

//! Populating a working set: snapshot, quick preload or full crawl.
//!
//! ```text
//! start ──> snapshot hit (>= 1 record) ──────────────> Cache
//!   │
//!   └─ miss / empty / corrupt / too old
//!        ├─ full requested ──> crawl ──> save ───────> FullCrawl
//!        └─ otherwise ───────> pages 1..=N ──────────> QuickPreload
//! ```
//!
//! The loader only builds indexes. Swapping one in is up to the caller.

use crate::index::MovieIndex;
use crate::models::{Config, LoadOrigin, LoadReport, LoadingProgress, MovieRecord};
use crate::pipeline::crawl::{FullCrawler, fetch_pages, flatten_pages};
use crate::source::MovieSource;
use crate::storage::{SnapshotMetadata, SnapshotStore};

/// A freshly built index (when loading succeeded) and its report.
#[derive(Debug)]
pub struct LoadOutcome {
    pub index: Option<MovieIndex>,
    pub report: LoadReport,
}

impl LoadOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            index: None,
            report: LoadReport::failed(message),
        }
    }
}

/// Records from a block of extra pages.
#[derive(Debug, Clone)]
pub struct ExtraPages {
    pub movies: Vec<MovieRecord>,
    pub requested: usize,
    pub failed: usize,
}

impl ExtraPages {
    /// Every page in the block failed.
    pub fn all_failed(&self) -> bool {
        self.requested > 0 && self.failed == self.requested
    }
}

pub struct Loader<'a> {
    source: &'a dyn MovieSource,
    store: &'a dyn SnapshotStore,
    config: &'a Config,
}

impl<'a> Loader<'a> {
    pub fn new(
        source: &'a dyn MovieSource,
        store: &'a dyn SnapshotStore,
        config: &'a Config,
    ) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    /// Snapshot first, then a full crawl or a quick preload.
    pub async fn initialize<F>(&self, full: bool, on_progress: F) -> LoadOutcome
    where
        F: FnMut(LoadingProgress) + Send,
    {
        if let Some(outcome) = self.load_cached().await {
            return outcome;
        }

        if full {
            self.full_crawl(on_progress).await
        } else {
            self.quick_preload().await
        }
    }

    /// Index from the persisted snapshot, or `None` on any kind of miss.
    pub async fn load_cached(&self) -> Option<LoadOutcome> {
        let name = &self.config.storage.snapshot_name;
        let snapshot = match self.store.load(name).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Ignoring snapshot '{}': {}", name, e);
                return None;
            }
        };

        if snapshot.movies.is_empty() {
            log::info!("Snapshot '{}' is empty, ignoring", name);
            return None;
        }

        let age = snapshot.age_secs();
        if let Some(hours) = self.config.storage.max_snapshot_age_hours {
            let max_age = i64::try_from(hours.saturating_mul(3600)).unwrap_or(i64::MAX);
            if age > max_age {
                log::info!(
                    "Snapshot '{}' is {}s old (max {}h), ignoring",
                    name,
                    age,
                    hours
                );
                return None;
            }
        }

        let index = MovieIndex::from_records(snapshot.movies, LoadOrigin::Cache);
        log::info!("Loaded {} movies from snapshot '{}' ({}s old)", index.len(), name, age);

        Some(LoadOutcome {
            report: LoadReport {
                origin: LoadOrigin::Cache,
                total_movies: index.len(),
                from_cache: true,
                cache_age_secs: Some(age),
                pages_fetched: 0,
                error: None,
            },
            index: Some(index),
        })
    }

    /// First pages of the latest listing, fetched concurrently.
    ///
    /// Always produces an index, possibly empty. An unreachable source is
    /// reported in `error` but does not fail the load.
    pub async fn quick_preload(&self) -> LoadOutcome {
        let pages = self.config.loader.quick_preload_pages;
        let outcomes = fetch_pages(self.source, 1..=pages, self.config.loader.batch_size).await;
        let requested = outcomes.len();
        let (movies, failed) = flatten_pages(outcomes);

        let error = if requested > 0 && failed == requested {
            log::error!("Quick preload: all {} pages unavailable", requested);
            Some(format!(
                "movie source unavailable: all {requested} preload pages failed"
            ))
        } else {
            None
        };

        let index = MovieIndex::from_records(movies, LoadOrigin::QuickPreload);
        log::info!(
            "Quick preload: {} movies from {} pages ({} failed)",
            index.len(),
            requested,
            failed
        );

        LoadOutcome {
            report: LoadReport {
                origin: LoadOrigin::QuickPreload,
                total_movies: index.len(),
                from_cache: false,
                cache_age_secs: None,
                pages_fetched: requested,
                error,
            },
            index: Some(index),
        }
    }

    /// Crawl the whole catalog, then persist it (best effort).
    pub async fn full_crawl<F>(&self, on_progress: F) -> LoadOutcome
    where
        F: FnMut(LoadingProgress) + Send,
    {
        let crawl = FullCrawler::new(self.source, &self.config.loader)
            .run(on_progress)
            .await;

        if crawl.source_unavailable() {
            log::error!(
                "Full crawl failed: all {} pages unavailable",
                crawl.pages_fetched
            );
            return LoadOutcome::failed(format!(
                "movie source unavailable: all {} crawled pages failed",
                crawl.pages_fetched
            ));
        }

        let index = MovieIndex::from_records(crawl.movies, LoadOrigin::FullCrawl);
        self.persist(&index, crawl.pages_fetched).await;

        LoadOutcome {
            report: LoadReport {
                origin: LoadOrigin::FullCrawl,
                total_movies: index.len(),
                from_cache: false,
                cache_age_secs: None,
                pages_fetched: crawl.pages_fetched,
                error: None,
            },
            index: Some(index),
        }
    }

    /// The block of pages extended queries merge in.
    pub async fn fetch_extra_pages(&self) -> ExtraPages {
        let loader = &self.config.loader;
        let start = loader.extended_start_page();
        let pages = start..start + loader.extended_pages;

        let outcomes = fetch_pages(self.source, pages.clone(), loader.batch_size).await;
        let requested = outcomes.len();
        let (movies, failed) = flatten_pages(outcomes);
        log::debug!(
            "Fetched extra pages {:?}: {} records, {} failed",
            pages,
            movies.len(),
            failed
        );

        ExtraPages {
            movies,
            requested,
            failed,
        }
    }

    async fn persist(&self, index: &MovieIndex, pages_crawled: usize) {
        if index.is_empty() {
            log::warn!("Full crawl returned no movies, snapshot not written");
            return;
        }

        let name = &self.config.storage.snapshot_name;
        let metadata = SnapshotMetadata::new(index.len(), index.facets(), pages_crawled);
        if let Err(e) = self.store.save(name, index.movies(), &metadata).await {
            log::warn!("Failed to save snapshot '{}': {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::storage::{MemorySnapshotStore, SnapshotRef};
    use crate::test_support::FakeSource;

    fn config() -> Config {
        Config::default()
    }

    #[tokio::test]
    async fn test_quick_preload_reads_first_pages() {
        let source = FakeSource::catalog(30, 2);
        let store = MemorySnapshotStore::new();
        let config = config();

        let outcome = Loader::new(&source, &store, &config)
            .initialize(false, |_| {})
            .await;

        assert!(outcome.report.is_ok());
        assert_eq!(outcome.report.origin, LoadOrigin::QuickPreload);
        assert_eq!(outcome.report.total_movies, 20);
        assert!(!outcome.report.from_cache);
        assert_eq!(source.requested_pages(), (1..=10).collect::<Vec<_>>());
        // Quick preloads are never persisted.
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_quick_preload_swallows_page_failures() {
        let source = FakeSource::catalog(30, 2).failing_pages(&[2, 5]);
        let store = MemorySnapshotStore::new();
        let config = config();

        let outcome = Loader::new(&source, &store, &config).quick_preload().await;
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.report.total_movies, 16);
    }

    #[tokio::test]
    async fn test_full_crawl_persists_and_next_load_hits_cache() {
        let source = FakeSource::catalog(12, 2);
        let store = MemorySnapshotStore::new();
        let config = config();
        let loader = Loader::new(&source, &store, &config);

        let mut progress = Vec::new();
        let outcome = loader.initialize(true, |p| progress.push(p)).await;
        assert_eq!(outcome.report.origin, LoadOrigin::FullCrawl);
        assert_eq!(outcome.report.total_movies, 24);
        assert!(!progress.is_empty());

        let cached = loader.initialize(true, |_| {}).await;
        assert_eq!(cached.report.origin, LoadOrigin::Cache);
        assert!(cached.report.from_cache);
        assert_eq!(cached.report.total_movies, 24);
        assert!(cached.report.cache_age_secs.is_some());
        assert!(cached.index.unwrap().is_full_database());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_a_miss() {
        let source = FakeSource::catalog(3, 1);
        let store = MemorySnapshotStore::new();
        store.put_raw("movie-database", b"{broken".to_vec()).await;
        let config = config();

        let outcome = Loader::new(&source, &store, &config)
            .initialize(false, |_| {})
            .await;
        assert_eq!(outcome.report.origin, LoadOrigin::QuickPreload);
        assert_eq!(outcome.report.total_movies, 3);
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_a_miss() {
        let source = FakeSource::catalog(1, 1);
        let store = MemorySnapshotStore::new();
        store
            .save("movie-database", &[], &SnapshotMetadata::default())
            .await
            .unwrap();
        let config = config();

        let outcome = Loader::new(&source, &store, &config)
            .initialize(false, |_| {})
            .await;
        assert_eq!(outcome.report.origin, LoadOrigin::QuickPreload);
    }

    #[tokio::test]
    async fn test_snapshot_older_than_max_age_is_a_miss() {
        let source = FakeSource::catalog(1, 1);
        let store = MemorySnapshotStore::new();
        let mut config = config();
        config.storage.max_snapshot_age_hours = Some(1);

        let movies = [MovieRecord::new("a", "A")];
        let metadata = SnapshotMetadata::default();
        let mut snapshot = SnapshotRef::new(&movies, &metadata).unwrap();
        snapshot.timestamp = Utc::now() - chrono::Duration::hours(2);
        store
            .put_raw("movie-database", serde_json::to_vec(&snapshot).unwrap())
            .await;

        let loader = Loader::new(&source, &store, &config);
        assert!(loader.load_cached().await.is_none());

        config.storage.max_snapshot_age_hours = None;
        let loader = Loader::new(&source, &store, &config);
        assert!(loader.load_cached().await.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_source_reports_error() {
        let source = FakeSource::catalog(5, 1).failing_all();
        let store = MemorySnapshotStore::new();
        let config = config();
        let loader = Loader::new(&source, &store, &config);

        // Quick preload still completes, with an empty index and the outage noted.
        let quick = loader.initialize(false, |_| {}).await;
        assert_eq!(quick.report.origin, LoadOrigin::QuickPreload);
        assert!(!quick.report.from_cache);
        assert_eq!(quick.report.total_movies, 0);
        assert!(quick.report.error.is_some());
        assert!(quick.index.unwrap().is_empty());

        let full = loader.full_crawl(|_| {}).await;
        assert!(full.index.is_none());
        assert!(full.report.error.is_some());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_extra_pages_block() {
        let source = FakeSource::catalog(40, 1).failing_pages(&[15]);
        let store = MemorySnapshotStore::new();
        let config = config();

        let extra = Loader::new(&source, &store, &config)
            .fetch_extra_pages()
            .await;
        assert_eq!(extra.requested, 20);
        assert_eq!(extra.failed, 1);
        assert_eq!(extra.movies.len(), 19);
        assert_eq!(source.requested_pages(), (11..=30).collect::<Vec<_>>());
        assert!(!extra.all_failed());
    }
}
