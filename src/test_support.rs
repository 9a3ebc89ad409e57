//! Shared fakes for unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::index::SortSpec;
use crate::models::MovieRecord;
use crate::source::{ListPage, MovieSource};

/// In-memory movie source with scripted pages.
#[derive(Default)]
pub struct FakeSource {
    pages: BTreeMap<usize, Vec<MovieRecord>>,
    lists: HashMap<String, ListPage>,
    failing: HashSet<usize>,
    fail_all: bool,
    delay: Duration,
    requested: Mutex<Vec<usize>>,
    list_requests: Mutex<Vec<(String, usize, Option<SortSpec>)>>,
}

impl FakeSource {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pages `1..=pages` each holding `per_page` distinct movies.
    pub fn catalog(pages: usize, per_page: usize) -> Self {
        let mut source = Self::default();
        for page in 1..=pages {
            let movies = (0..per_page)
                .map(|i| MovieRecord::new(format!("movie-{page}-{i}"), format!("Movie {page}-{i}")))
                .collect();
            source.pages.insert(page, movies);
        }
        source
    }

    pub fn with_page(mut self, page: usize, movies: Vec<MovieRecord>) -> Self {
        self.pages.insert(page, movies);
        self
    }

    pub fn with_duplicate_on_page(mut self, page: usize, slug: &str) -> Self {
        self.pages
            .entry(page)
            .or_default()
            .push(MovieRecord::new(slug, "Duplicate"));
        self
    }

    pub fn with_list(mut self, slug: &str, list: ListPage) -> Self {
        self.lists.insert(slug.to_string(), list);
        self
    }

    pub fn failing_pages(mut self, pages: &[usize]) -> Self {
        self.failing.extend(pages.iter().copied());
        self
    }

    pub fn failing_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requested_pages(&self) -> Vec<usize> {
        let mut pages = self.requested.lock().unwrap().clone();
        pages.sort_unstable();
        pages
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn max_requested_page(&self) -> usize {
        self.requested_pages().last().copied().unwrap_or(0)
    }

    pub fn list_requests(&self) -> Vec<(String, usize, Option<SortSpec>)> {
        self.list_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieSource for FakeSource {
    async fn fetch_page(&self, page: usize) -> Result<Vec<MovieRecord>> {
        self.requested.lock().unwrap().push(page);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_all || self.failing.contains(&page) {
            return Err(AppError::remote(format!("page {page}"), "connection refused"));
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    async fn fetch_list(
        &self,
        list_slug: &str,
        page: usize,
        sort: Option<SortSpec>,
    ) -> Result<ListPage> {
        self.list_requests
            .lock()
            .unwrap()
            .push((list_slug.to_string(), page, sort));
        if self.fail_all {
            return Err(AppError::remote(list_slug, "connection refused"));
        }
        Ok(self.lists.get(list_slug).cloned().unwrap_or_default())
    }
}
