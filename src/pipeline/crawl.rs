// src/pipeline/crawl.rs

//! Batched page fetching and the full-catalog crawl.

use futures::stream::{self, StreamExt};

use crate::index::dedupe_by_slug;
use crate::models::{LoaderConfig, LoadingProgress, MovieRecord};
use crate::source::MovieSource;

/// Result of fetching a single page. Failures are folded into an empty page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    pub page: usize,
    pub movies: Vec<MovieRecord>,
    pub error: Option<String>,
}

impl PageOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Fetch `pages` with at most `concurrency` requests in flight.
///
/// Output order matches input order, so first-wins deduplication downstream
/// is deterministic.
pub async fn fetch_pages<I>(
    source: &dyn MovieSource,
    pages: I,
    concurrency: usize,
) -> Vec<PageOutcome>
where
    I: IntoIterator<Item = usize>,
    I::IntoIter: Send,
{
    stream::iter(pages)
        .map(|page| async move {
            match source.fetch_page(page).await {
                Ok(movies) => PageOutcome {
                    page,
                    movies,
                    error: None,
                },
                Err(error) => {
                    log::warn!("Failed to fetch page {}: {}", page, error);
                    PageOutcome {
                        page,
                        movies: Vec::new(),
                        error: Some(error.to_string()),
                    }
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Concatenate page results in page order and count failed pages.
pub fn flatten_pages(outcomes: Vec<PageOutcome>) -> (Vec<MovieRecord>, usize) {
    let failed = outcomes.iter().filter(|o| o.failed()).count();
    let movies = outcomes.into_iter().flat_map(|o| o.movies).collect();
    (movies, failed)
}

/// Why a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A whole batch came back empty
    EmptyBatch,
    /// Too many empty pages in a row
    ConsecutiveEmpty,
    /// The estimated page budget was used up
    PageBudget,
}

/// Summary of a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Deduplicated records, first occurrence wins
    pub movies: Vec<MovieRecord>,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    /// Highest page number requested
    pub last_page: usize,
    pub stop_reason: StopReason,
}

impl CrawlOutcome {
    /// Every request failed: the source itself is unusable.
    pub fn source_unavailable(&self) -> bool {
        self.pages_fetched > 0 && self.pages_failed == self.pages_fetched
    }
}

/// Crawls the whole remote catalog in concurrent batches.
pub struct FullCrawler<'a> {
    source: &'a dyn MovieSource,
    config: &'a LoaderConfig,
}

impl<'a> FullCrawler<'a> {
    pub fn new(source: &'a dyn MovieSource, config: &'a LoaderConfig) -> Self {
        Self { source, config }
    }

    /// Crawl from page 1 until the catalog runs dry or the budget is spent.
    ///
    /// `on_progress` is called once per batch.
    pub async fn run<F>(&self, mut on_progress: F) -> CrawlOutcome
    where
        F: FnMut(LoadingProgress) + Send,
    {
        let total = self.config.estimated_total_pages;
        let batch_size = self.config.batch_size.max(1);
        let delay = self.config.batch_delay();

        let mut collected = Vec::new();
        let mut next_page = 1;
        let mut consecutive_empty = 0;
        let mut pages_fetched = 0;
        let mut pages_failed = 0;
        let mut last_page = 0;

        let stop_reason = loop {
            if next_page > total {
                break StopReason::PageBudget;
            }

            let end = (next_page + batch_size - 1).min(total);
            let outcomes = fetch_pages(self.source, next_page..=end, batch_size).await;

            let mut non_empty = 0;
            for outcome in outcomes {
                pages_fetched += 1;
                if outcome.failed() {
                    pages_failed += 1;
                }
                if outcome.movies.is_empty() {
                    consecutive_empty += 1;
                } else {
                    non_empty += 1;
                    consecutive_empty = 0;
                    collected.extend(outcome.movies);
                }
            }

            last_page = end;
            on_progress(LoadingProgress::new(end, total));
            log::debug!(
                "Crawled pages {}..={} ({} non-empty, {} records so far)",
                next_page,
                end,
                non_empty,
                collected.len()
            );

            if non_empty == 0 {
                break StopReason::EmptyBatch;
            }
            if consecutive_empty >= self.config.max_consecutive_empty {
                break StopReason::ConsecutiveEmpty;
            }

            next_page = end + 1;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        };

        let raw_count = collected.len();
        let movies = dedupe_by_slug(collected);
        log::info!(
            "Crawl stopped ({:?}) after {} pages: {} records, {} unique",
            stop_reason,
            pages_fetched,
            raw_count,
            movies.len()
        );

        CrawlOutcome {
            movies,
            pages_fetched,
            pages_failed,
            last_page,
            stop_reason,
        }
    }
}
