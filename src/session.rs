// src/session.rs

//! Debounced, last-issued-wins query submission for interactive callers.
//!
//! Every submission takes a ticket from a shared counter. After the
//! debounce delay, and again once the result is in, a submission that is
//! no longer the newest one gives up and yields `None`. Dropping the
//! returned future cancels whatever request it has in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::models::{SearchOptions, SearchResult};
use crate::service::MovieSearch;

/// Which query a session submission runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionQuery {
    Instant,
    Extended,
    FullDatabase,
    /// The instant → extended → remote ladder
    Staged { list_slug: Option<String> },
}

pub struct SearchSession {
    search: Arc<MovieSearch>,
    debounce: Duration,
    latest: AtomicU64,
}

impl SearchSession {
    pub fn new(search: Arc<MovieSearch>) -> Self {
        let debounce = Duration::from_millis(search.config().session.debounce_ms);
        Self {
            search,
            debounce,
            latest: AtomicU64::new(0),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Run `query` unless a newer submission supersedes it first.
    pub async fn submit(
        &self,
        keyword: &str,
        options: &SearchOptions,
        query: SessionQuery,
    ) -> Option<SearchResult> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if !self.is_current(ticket) {
            log::debug!("Query #{} superseded during debounce", ticket);
            return None;
        }

        let result = match &query {
            SessionQuery::Instant => self.search.instant_search(keyword, options).await,
            SessionQuery::Extended => self.search.extended_search(keyword, options).await,
            SessionQuery::FullDatabase => self.search.full_database_search(keyword, options).await,
            SessionQuery::Staged { list_slug } => {
                self.search
                    .staged_search(keyword, options, list_slug.as_deref())
                    .await
            }
        };

        if !self.is_current(ticket) {
            log::debug!("Discarding stale result of query #{}", ticket);
            return None;
        }
        Some(result)
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;
    use crate::storage::MemorySnapshotStore;
    use crate::test_support::FakeSource;

    async fn session(source: FakeSource) -> SearchSession {
        let search = MovieSearch::new(
            Config::default(),
            Arc::new(source),
            Arc::new(MemorySnapshotStore::new()),
        )
        .unwrap();
        search.initialize(false).await;
        SearchSession::new(Arc::new(search))
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_query_waits_for_debounce() {
        let session = session(FakeSource::catalog(2, 1)).await;
        let start = tokio::time::Instant::now();

        let result = session
            .submit("movie", &SearchOptions::default(), SessionQuery::Instant)
            .await
            .unwrap();
        assert_eq!(result.total_items, 2);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_query_supersedes_pending_one() {
        let session = session(FakeSource::catalog(2, 1)).await;
        let options = SearchOptions::default();

        let first = session.submit("movie 1", &options, SessionQuery::Instant);
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            session
                .submit("movie 2", &options, SessionQuery::Instant)
                .await
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_none());
        let second = second.unwrap();
        assert_eq!(second.items[0].slug, "movie-2-0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_is_discarded() {
        let source = FakeSource::catalog(20, 1).with_delay(Duration::from_secs(1));
        let session = session(source).await;
        let options = SearchOptions::default();

        // Extended search waits on slow remote pages.
        let slow = session.submit("movie", &options, SessionQuery::Extended);
        let fast = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            session.submit("movie 1", &options, SessionQuery::Instant).await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert!(slow.is_none());
        assert!(fast.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_staged_query_through_session() {
        let session = session(FakeSource::catalog(2, 1))
            .await
            .with_debounce(Duration::ZERO);

        let result = session
            .submit(
                "movie",
                &SearchOptions::default(),
                SessionQuery::Staged { list_slug: None },
            )
            .await
            .unwrap();
        assert_eq!(result.total_items, 2);
    }
}
