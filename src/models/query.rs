//! Query options and the result envelope returned by every search mode.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{AppError, ErrorKind, Result};
use crate::models::MovieRecord;

/// Options recognized by every query mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// 1-based page number
    #[serde(default = "defaults::page")]
    pub page: usize,

    /// Page size
    #[serde(default = "defaults::limit")]
    pub limit: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    /// `series` or `single`; anything else is ignored
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub movie_type: Option<String>,

    /// Sort field: `modified.time`, `_id` or `year`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// `asc` or `desc`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_type: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page: defaults::page(),
            limit: defaults::limit(),
            category: None,
            country: None,
            year: None,
            movie_type: None,
            sort: None,
            sort_type: None,
        }
    }
}

impl SearchOptions {
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_type(mut self, movie_type: impl Into<String>) -> Self {
        self.movie_type = Some(movie_type.into());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self.sort_type = Some(order.into());
        self
    }

    /// Reject options no query can answer.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(AppError::validation("limit must be > 0"));
        }
        Ok(())
    }

    /// Result-cache key for this query in the given mode.
    pub fn cache_key(&self, mode: SearchMode, keyword: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Key<'a> {
            keyword: &'a str,
            #[serde(flatten)]
            options: &'a SearchOptions,
        }

        let json = serde_json::to_string(&Key {
            keyword: keyword.trim(),
            options: self,
        })?;
        Ok(format!("{}:{}", mode.as_str(), json))
    }
}

/// Which part of the catalog a query consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    /// Current working set only
    Instant,
    /// Working set merged with an extra block of remote pages
    Extended,
    /// Working set after a full crawl
    FullDatabase,
    /// Remote list endpoint
    Remote,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Extended => "extended",
            Self::FullDatabase => "fullDatabase",
            Self::Remote => "remote",
        }
    }
}

/// Whether a result can be trusted as "these are all the matches".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueryStatus {
    Ok,
    /// Results were computed, but part of the data could not be fetched
    Degraded { kind: ErrorKind },
    /// Nothing could be computed; the envelope is zeroed
    Failed { kind: ErrorKind, message: String },
}

impl QueryStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Size of the collection that was searched
    pub total_movies: usize,
    /// Matches before pagination
    pub filtered_results: usize,
}

/// Common return contract for all query modes.
///
/// Serializes with camelCase keys plus a `"<mode>": true` flag next to
/// `mode`, e.g. `{"mode": "instant", "instant": true, ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The requested page only
    pub items: Vec<MovieRecord>,
    /// Matches across all pages
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub mode: SearchMode,
    pub search_stats: SearchStats,
    pub status: QueryStatus,
}

impl SearchResult {
    /// Zeroed envelope for a query that could not be answered.
    pub fn failed(mode: SearchMode, error: &AppError) -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
            current_page: 1,
            mode,
            search_stats: SearchStats::default(),
            status: QueryStatus::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

impl Serialize for SearchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SearchResult", 8)?;
        state.serialize_field("items", &self.items)?;
        state.serialize_field("totalItems", &self.total_items)?;
        state.serialize_field("totalPages", &self.total_pages)?;
        state.serialize_field("currentPage", &self.current_page)?;
        state.serialize_field("mode", &self.mode)?;
        state.serialize_field(self.mode.as_str(), &true)?;
        state.serialize_field("searchStats", &self.search_stats)?;
        state.serialize_field("status", &self.status)?;
        state.end()
    }
}

mod defaults {
    pub fn page() -> usize {
        1
    }
    pub fn limit() -> usize {
        20
    }
}
