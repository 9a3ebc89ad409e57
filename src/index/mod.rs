//! In-memory movie index.
//!
//! Holds the working set (deduplicated by slug) and the facet lists derived
//! from it. An index value is never mutated while it is shared: the loader
//! builds a fresh `MovieIndex` and swaps it in as a whole.

mod filter;
mod page;
mod sort;

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::models::{LoadOrigin, MovieRecord};

pub use filter::MovieFilter;
pub use page::{Page, paginate};
pub use sort::{SortField, SortOrder, SortSpec};

/// Keep the first record for every slug, preserving input order.
pub fn dedupe_by_slug(records: impl IntoIterator<Item = MovieRecord>) -> Vec<MovieRecord> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for record in records {
        if seen.insert(record.slug.clone()) {
            deduped.push(record);
        }
    }
    deduped
}

/// Distinct category names, country names and years of a working set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetSets {
    pub categories: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    pub years: BTreeSet<i64>,
}

impl FacetSets {
    pub fn from_records(records: &[MovieRecord]) -> Self {
        let mut facets = Self::default();
        for movie in records {
            facets.add(movie);
        }
        facets
    }

    fn add(&mut self, movie: &MovieRecord) {
        for name in movie.category_names().filter(|n| !n.trim().is_empty()) {
            self.categories.insert(name.trim().to_string());
        }
        for name in movie.country_names().filter(|n| !n.trim().is_empty()) {
            self.countries.insert(name.trim().to_string());
        }
        if let Some(year) = movie.year_value() {
            self.years.insert(year);
        }
    }

    /// Years, newest first.
    pub fn years_desc(&self) -> Vec<i64> {
        self.years.iter().rev().copied().collect()
    }
}

/// The working set plus its derived facets.
#[derive(Debug, Clone)]
pub struct MovieIndex {
    movies: Vec<MovieRecord>,
    facets: FacetSets,
    origin: LoadOrigin,
    loaded_at: Option<DateTime<Utc>>,
}

impl MovieIndex {
    /// An empty index, as at process start.
    pub fn empty() -> Self {
        Self {
            movies: Vec::new(),
            facets: FacetSets::default(),
            origin: LoadOrigin::Empty,
            loaded_at: None,
        }
    }

    /// Build an index from raw records (deduplicated, first wins).
    pub fn from_records(records: Vec<MovieRecord>, origin: LoadOrigin) -> Self {
        let mut index = Self::empty();
        index.replace_all(records);
        index.origin = origin;
        index
    }

    /// Replace the working set wholesale and recompute facets.
    pub fn replace_all(&mut self, records: Vec<MovieRecord>) {
        self.movies = dedupe_by_slug(records);
        self.facets = FacetSets::from_records(&self.movies);
        self.loaded_at = Some(Utc::now());
    }

    /// Append records whose slug is not yet present and recompute facets.
    pub fn extend(&mut self, records: Vec<MovieRecord>) {
        let mut seen: HashSet<String> = self.movies.iter().map(|m| m.slug.clone()).collect();
        for record in records {
            if seen.insert(record.slug.clone()) {
                self.movies.push(record);
            }
        }
        self.facets = FacetSets::from_records(&self.movies);
    }

    /// Working set followed by the `extra` records it does not contain yet.
    ///
    /// Borrowed view for a single query; `self` is left untouched.
    pub fn merged_view<'a>(&'a self, extra: &'a [MovieRecord]) -> Vec<&'a MovieRecord> {
        let mut seen: HashSet<&str> = self.movies.iter().map(|m| m.slug.as_str()).collect();
        let mut merged: Vec<&MovieRecord> = self.movies.iter().collect();
        for record in extra {
            if seen.insert(record.slug.as_str()) {
                merged.push(record);
            }
        }
        merged
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn facets(&self) -> &FacetSets {
        &self.facets
    }

    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Whether a completed full crawl (or its snapshot) populated this index.
    pub fn is_full_database(&self) -> bool {
        matches!(self.origin, LoadOrigin::FullCrawl | LoadOrigin::Cache)
    }
}

impl Default for MovieIndex {
    fn default() -> Self {
        Self::empty()
    }
}
