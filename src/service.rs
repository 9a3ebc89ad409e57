// src/service.rs

//! Search facade shared by every caller.
//!
//! `MovieSearch` owns the working set, the query-result cache and the two
//! collaborators (remote source and snapshot store). It is `Send + Sync`
//! and meant to be shared through an `Arc`.
//!
//! No public operation returns an error: queries answer with a
//! [`SearchResult`] whose `status` says how far it can be trusted, and
//! loads answer with a [`LoadReport`].

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::error::{ErrorKind, Result};
use crate::index::{MovieFilter, MovieIndex, SortSpec, paginate};
use crate::models::{
    CacheStatus, Config, IndexStats, LoadReport, LoadingProgress, MovieRecord, QueryStatus,
    SearchMode, SearchOptions, SearchResult, SearchStats,
};
use crate::pipeline::{LoadOutcome, Loader, QueryCache};
use crate::source::{HttpMovieSource, MovieSource};
use crate::storage::{LocalSnapshotStore, SnapshotStore};

pub struct MovieSearch {
    config: Arc<Config>,
    source: Arc<dyn MovieSource>,
    store: Arc<dyn SnapshotStore>,
    index: RwLock<Arc<MovieIndex>>,
    cache: Mutex<QueryCache>,
    /// Bumped on every index swap; results computed across a swap are not cached.
    generation: AtomicU64,
    /// Serializes loaders so two crawls never race to swap.
    load_lock: Mutex<()>,
}

impl MovieSearch {
    pub fn new(
        config: Config,
        source: Arc<dyn MovieSource>,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self> {
        config.validate()?;
        let cache = QueryCache::new(config.cache.max_entries);
        Ok(Self {
            config: Arc::new(config),
            source,
            store,
            index: RwLock::new(Arc::new(MovieIndex::empty())),
            cache: Mutex::new(cache),
            generation: AtomicU64::new(0),
            load_lock: Mutex::new(()),
        })
    }

    /// HTTP source and local snapshot store, both built from `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let source = HttpMovieSource::new(config.source.clone())?;
        let store = LocalSnapshotStore::new(&config.storage.dir);
        Self::new(config, Arc::new(source), Arc::new(store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The working set as of now. Later swaps do not affect the returned value.
    pub async fn current_index(&self) -> Arc<MovieIndex> {
        self.index.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Populate the working set: snapshot, else full crawl (`full`) or quick preload.
    pub async fn initialize(&self, full: bool) -> LoadReport {
        self.run_loader(full, |_| {}).await
    }

    /// Full-database load with a progress callback per crawled batch.
    ///
    /// A usable snapshot short-circuits the crawl.
    pub async fn load_full_database_with_progress<F>(&self, on_progress: F) -> LoadReport
    where
        F: FnMut(LoadingProgress) + Send,
    {
        self.run_loader(true, on_progress).await
    }

    /// Drop everything in memory and load again from the start.
    pub async fn refresh(&self, full: bool) -> LoadReport {
        self.reset().await;
        self.initialize(full).await
    }

    /// Clear the working set, its facets and the query cache without reloading.
    pub async fn reset(&self) {
        self.swap_index(MovieIndex::empty()).await;
        log::info!("Search index reset");
    }

    async fn run_loader<F>(&self, full: bool, on_progress: F) -> LoadReport
    where
        F: FnMut(LoadingProgress) + Send,
    {
        let _guard = self.load_lock.lock().await;
        let outcome = self.loader().initialize(full, on_progress).await;
        self.apply(outcome).await
    }

    async fn apply(&self, outcome: LoadOutcome) -> LoadReport {
        match outcome.index {
            Some(index) => self.swap_index(index).await,
            None => log::warn!(
                "Load failed, keeping current working set: {}",
                outcome.report.error.as_deref().unwrap_or("unknown error")
            ),
        }
        outcome.report
    }

    async fn swap_index(&self, index: MovieIndex) {
        *self.index.write().await = Arc::new(index);
        let mut cache = self.cache.lock().await;
        cache.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn loader(&self) -> Loader<'_> {
        Loader::new(self.source.as_ref(), self.store.as_ref(), &self.config)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Filter the current working set. Never touches the network.
    pub async fn instant_search(&self, keyword: &str, options: &SearchOptions) -> SearchResult {
        let ttl = self.config.cache.instant_ttl();
        self.cached(
            SearchMode::Instant,
            keyword,
            options,
            ttl,
            self.search_working_set(SearchMode::Instant, keyword, options),
        )
        .await
    }

    /// Filter the working set merged with the extra block of remote pages.
    ///
    /// The merge is private to this query; the shared working set stays as is.
    pub async fn extended_search(&self, keyword: &str, options: &SearchOptions) -> SearchResult {
        let ttl = self.config.cache.instant_ttl();
        self.cached(
            SearchMode::Extended,
            keyword,
            options,
            ttl,
            self.search_extended(keyword, options),
        )
        .await
    }

    /// Filter the working set assuming a full crawl populated it.
    pub async fn full_database_search(
        &self,
        keyword: &str,
        options: &SearchOptions,
    ) -> SearchResult {
        let ttl = self.config.cache.full_ttl();
        self.cached(
            SearchMode::FullDatabase,
            keyword,
            options,
            ttl,
            self.search_working_set(SearchMode::FullDatabase, keyword, options),
        )
        .await
    }

    /// Browse the whole working set with facet filters only.
    pub async fn get_all_movies(&self, options: &SearchOptions) -> SearchResult {
        self.full_database_search("", options).await
    }

    /// One page of a remote advanced-search list, sorted by the API.
    pub async fn remote_list(&self, list_slug: &str, options: &SearchOptions) -> SearchResult {
        self.remote_search(list_slug, "", options).await
    }

    /// Instant, then extended, then (with `list_slug`) the remote list.
    ///
    /// Each stage runs only when the previous one found nothing. A working
    /// set that holds the full catalog is authoritative, so the ladder stops
    /// after the instant stage.
    pub async fn staged_search(
        &self,
        keyword: &str,
        options: &SearchOptions,
        list_slug: Option<&str>,
    ) -> SearchResult {
        let instant = self.instant_search(keyword, options).await;
        if !instant.is_empty() || !instant.status.is_ok() {
            return instant;
        }
        if self.current_index().await.is_full_database() {
            log::debug!("No instant matches for '{}' in full database", keyword);
            return instant;
        }

        let extended = self.extended_search(keyword, options).await;
        if !extended.is_empty() {
            return extended;
        }

        match list_slug {
            Some(slug) => {
                log::debug!("Falling back to remote list '{}' for '{}'", slug, keyword);
                self.remote_search(slug, keyword, options).await
            }
            None => extended,
        }
    }

    async fn remote_search(
        &self,
        list_slug: &str,
        keyword: &str,
        options: &SearchOptions,
    ) -> SearchResult {
        let ttl = self.config.cache.instant_ttl();
        let key_keyword = format!("{list_slug}/{keyword}");
        self.cached(
            SearchMode::Remote,
            &key_keyword,
            options,
            ttl,
            self.search_remote(list_slug, keyword, options),
        )
        .await
    }

    /// Validate, consult the cache, compute, and store ok results.
    async fn cached<Fut>(
        &self,
        mode: SearchMode,
        keyword: &str,
        options: &SearchOptions,
        ttl: Duration,
        compute: Fut,
    ) -> SearchResult
    where
        Fut: Future<Output = SearchResult>,
    {
        if let Err(e) = options.validate() {
            log::debug!("Rejected {} query: {}", mode.as_str(), e);
            return SearchResult::failed(mode, &e);
        }
        let key = match options.cache_key(mode, keyword) {
            Ok(key) => key,
            Err(e) => return SearchResult::failed(mode, &e),
        };

        let hit = self.cache.lock().await.get(&key);
        if let Some(hit) = hit {
            log::debug!("Query cache hit: {}", key);
            return hit;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let result = compute.await;

        if result.status.is_ok() {
            let mut cache = self.cache.lock().await;
            if self.generation.load(Ordering::SeqCst) == generation {
                cache.insert(key, result.clone(), ttl);
            }
        }
        result
    }

    async fn search_working_set(
        &self,
        mode: SearchMode,
        keyword: &str,
        options: &SearchOptions,
    ) -> SearchResult {
        let index = self.current_index().await;
        let matches = MovieFilter::new(keyword, options).apply(index.movies());
        envelope(matches, index.len(), options, mode, QueryStatus::Ok)
    }

    async fn search_extended(&self, keyword: &str, options: &SearchOptions) -> SearchResult {
        let index = self.current_index().await;
        let filter = MovieFilter::new(keyword, options);

        if index.is_full_database() {
            let matches = filter.apply(index.movies());
            return envelope(matches, index.len(), options, SearchMode::Extended, QueryStatus::Ok);
        }

        let extra = self.loader().fetch_extra_pages().await;
        let status = if extra.all_failed() {
            log::warn!("Extended search: all {} extra pages failed", extra.requested);
            QueryStatus::Degraded {
                kind: ErrorKind::SourceUnavailable,
            }
        } else {
            QueryStatus::Ok
        };

        let merged = index.merged_view(&extra.movies);
        let searched = merged.len();
        let matches = filter.apply(merged);
        envelope(matches, searched, options, SearchMode::Extended, status)
    }

    async fn search_remote(
        &self,
        list_slug: &str,
        keyword: &str,
        options: &SearchOptions,
    ) -> SearchResult {
        let page = options.page.max(1);
        let sort = SortSpec::from_options(options);
        let list = match self.source.fetch_list(list_slug, page, sort).await {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Remote list '{}' page {} failed: {}", list_slug, page, e);
                return SearchResult::failed(SearchMode::Remote, &e);
            }
        };

        let fetched = list.items.len();
        let filter = MovieFilter::new(keyword, options);

        // Unfiltered pages report the API's own totals.
        if filter.is_empty() {
            let total_items = list.total_items.unwrap_or(fetched);
            let total_pages = list
                .total_pages
                .unwrap_or(if fetched == 0 { 0 } else { page });
            return SearchResult {
                items: list.items,
                total_items,
                total_pages,
                current_page: page,
                mode: SearchMode::Remote,
                search_stats: SearchStats {
                    total_movies: total_items,
                    filtered_results: total_items,
                },
                status: QueryStatus::Ok,
            };
        }

        // Filtered pages count only this page's matches but keep paging
        // through the remote list, so totals never fall behind `page`.
        let items: Vec<MovieRecord> = filter.apply(&list.items).into_iter().cloned().collect();
        SearchResult {
            total_items: items.len(),
            total_pages: list.total_pages.unwrap_or(page).max(page),
            current_page: page,
            mode: SearchMode::Remote,
            search_stats: SearchStats {
                total_movies: fetched,
                filtered_results: items.len(),
            },
            status: QueryStatus::Ok,
            items,
        }
    }

    // ------------------------------------------------------------------
    // Introspection and maintenance
    // ------------------------------------------------------------------

    pub async fn get_stats(&self) -> IndexStats {
        let index = self.current_index().await;
        let facets = index.facets();
        IndexStats {
            total_movies: index.len(),
            categories: facets.categories.iter().cloned().collect(),
            countries: facets.countries.iter().cloned().collect(),
            years: facets.years_desc(),
            origin: index.origin(),
            is_full_database: index.is_full_database(),
            loaded_at: index.loaded_at(),
            query_cache_entries: self.cache.lock().await.len(),
        }
    }

    pub async fn get_cache_status(&self) -> CacheStatus {
        let name = &self.config.storage.snapshot_name;
        let mut status = CacheStatus {
            has_snapshot: false,
            snapshot_movies: 0,
            snapshot_timestamp: None,
            snapshot_age_secs: None,
            working_set_size: self.current_index().await.len(),
            query_cache_entries: self.cache.lock().await.len(),
            error: None,
        };

        match self.store.info(name).await {
            Ok(Some(info)) => {
                status.has_snapshot = true;
                status.snapshot_movies = info.total_movies;
                status.snapshot_timestamp = Some(info.timestamp);
                status.snapshot_age_secs = Some((Utc::now() - info.timestamp).num_seconds().max(0));
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Cannot read snapshot '{}': {}", name, e);
                status.error = Some(e.to_string());
            }
        }
        status
    }

    /// Delete stored snapshots and cached query results.
    ///
    /// The working set itself is kept.
    pub async fn clear_persistent_cache(&self) -> bool {
        self.cache.lock().await.clear();
        match self.store.clear_all().await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to clear snapshots: {}", e);
                false
            }
        }
    }
}

/// Sort, paginate and wrap matches in the common result envelope.
fn envelope(
    mut matches: Vec<&MovieRecord>,
    searched: usize,
    options: &SearchOptions,
    mode: SearchMode,
    status: QueryStatus,
) -> SearchResult {
    if let Some(spec) = SortSpec::from_options(options) {
        spec.sort(&mut matches);
    }

    let page = paginate(&matches, options.page, options.limit);
    SearchResult {
        items: page.items.into_iter().cloned().collect(),
        total_items: page.total_items,
        total_pages: page.total_pages,
        current_page: page.current_page,
        mode,
        search_stats: SearchStats {
            total_movies: searched,
            filtered_results: page.total_items,
        },
        status,
    }
}
