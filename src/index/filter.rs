//! Keyword and facet filtering over a record collection.

use crate::models::{MovieRecord, MovieType, SearchOptions};

/// Compiled filter; all provided conditions are ANDed.
///
/// Category and country match when any facet name *contains* the filter
/// value (case-insensitive), so "Hàn Quốc" also matches "Hàn Quốc Mở Rộng".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    keyword: Option<String>,
    category: Option<String>,
    country: Option<String>,
    year: Option<String>,
    movie_type: Option<MovieType>,
}

impl MovieFilter {
    /// Build a filter from a search keyword and query options.
    ///
    /// The keyword and facet values are trimmed and lowercased, so `" x "`
    /// and `"X"` select the same records (and share a query cache entry).
    /// A keyword that is empty after trimming matches everything.
    pub fn new(keyword: &str, options: &SearchOptions) -> Self {
        Self {
            keyword: normalized(Some(keyword)),
            category: normalized(options.category.as_deref()),
            country: normalized(options.country.as_deref()),
            year: options
                .year
                .as_deref()
                .map(str::trim)
                .filter(|y| !y.is_empty())
                .map(String::from),
            movie_type: options.movie_type.as_deref().and_then(MovieType::parse),
        }
    }

    pub fn keyword(keyword: &str) -> Self {
        Self::new(keyword, &SearchOptions::default())
    }

    /// Whether no condition is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, movie: &MovieRecord) -> bool {
        if let Some(keyword) = &self.keyword {
            let hit = [&movie.name, &movie.origin_name, &movie.slug, &movie.content]
                .iter()
                .any(|field| field.to_lowercase().contains(keyword.as_str()));
            if !hit {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if !any_contains(movie.category_names(), category) {
                return false;
            }
        }

        if let Some(country) = &self.country {
            if !any_contains(movie.country_names(), country) {
                return false;
            }
        }

        if let Some(year) = &self.year {
            match &movie.year {
                Some(value) if value.loosely_equals(year) => {}
                _ => return false,
            }
        }

        if let Some(wanted) = self.movie_type {
            if movie.movie_type() != Some(wanted) {
                return false;
            }
        }

        true
    }

    /// Matching records, in input order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a MovieRecord>
    where
        I: IntoIterator<Item = &'a MovieRecord>,
    {
        records.into_iter().filter(|m| self.matches(m)).collect()
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn any_contains<'a>(mut names: impl Iterator<Item = &'a str>, needle: &str) -> bool {
    names.any(|name| name.to_lowercase().contains(needle))
}
