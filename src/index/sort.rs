//! In-memory ordering for the `sort` / `sortType` query options.

use std::cmp::Ordering;

use crate::models::{MovieRecord, SearchOptions};

/// Sortable fields, named the way the remote API names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// `modified.time`
    ModifiedTime,
    /// `_id` (creation order)
    Created,
    Year,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "modified.time" | "modified" => Some(Self::ModifiedTime),
            "_id" | "created" | "created.time" => Some(Self::Created),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Name used in remote query strings.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::ModifiedTime => "modified.time",
            Self::Created => "_id",
            Self::Year => "year",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A parsed sort request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    /// `None` when no sort is requested or the field is unknown.
    pub fn from_options(options: &SearchOptions) -> Option<Self> {
        let field = SortField::parse(options.sort.as_deref()?)?;
        let order = options
            .sort_type
            .as_deref()
            .map(SortOrder::parse)
            .unwrap_or_default();
        Some(Self { field, order })
    }

    /// Stable sort; records without the key go last in either order.
    pub fn sort(&self, records: &mut [&MovieRecord]) {
        records.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &MovieRecord, b: &MovieRecord) -> Ordering {
        match self.field {
            SortField::ModifiedTime => self.by_key(
                a.extra_str(&["modified", "time"]),
                b.extra_str(&["modified", "time"]),
            ),
            SortField::Created => self.by_key(created_key(a), created_key(b)),
            SortField::Year => self.by_key(a.year_value(), b.year_value()),
        }
    }

    fn by_key<T: Ord>(&self, a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => match self.order {
                SortOrder::Asc => a.cmp(&b),
                SortOrder::Desc => b.cmp(&a),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

fn created_key(movie: &MovieRecord) -> Option<&str> {
    movie
        .extra_str(&["_id"])
        .or_else(|| movie.extra_str(&["created", "time"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::movie;
    use serde_json::json;

    fn modified(slug: &str, time: Option<&str>) -> MovieRecord {
        let mut m = movie(slug, slug);
        if let Some(time) = time {
            m.extra.insert("modified".into(), json!({ "time": time }));
        }
        m
    }

    fn slugs(records: &[&MovieRecord]) -> Vec<String> {
        records.iter().map(|m| m.slug.clone()).collect()
    }

    #[test]
    fn test_unknown_field_is_noop() {
        let options = SearchOptions::default().with_sort("rating", "asc");
        assert!(SortSpec::from_options(&options).is_none());
        assert!(SortSpec::from_options(&SearchOptions::default()).is_none());
    }

    #[test]
    fn test_sort_by_modified_time() {
        let movies = vec![
            modified("b", Some("2024-02-01T00:00:00.000Z")),
            modified("none", None),
            modified("a", Some("2024-01-01T00:00:00.000Z")),
            modified("c", Some("2024-03-01T00:00:00.000Z")),
        ];

        let spec = SortSpec::from_options(
            &SearchOptions::default().with_sort("modified.time", "desc"),
        )
        .unwrap();
        let mut refs: Vec<&MovieRecord> = movies.iter().collect();
        spec.sort(&mut refs);
        assert_eq!(slugs(&refs), vec!["c", "b", "a", "none"]);

        let spec = SortSpec {
            order: SortOrder::Asc,
            ..spec
        };
        spec.sort(&mut refs);
        assert_eq!(slugs(&refs), vec!["a", "b", "c", "none"]);
    }

    #[test]
    fn test_sort_by_year_is_stable() {
        let mut a = movie("a", "A");
        a.year = Some(2020_i64.into());
        let mut b = movie("b", "B");
        b.year = Some("2022".into());
        let mut c = movie("c", "C");
        c.year = Some(2020_i64.into());
        let movies = vec![a, b, c];

        let spec = SortSpec::from_options(&SearchOptions::default().with_sort("year", "DESC")).unwrap();
        let mut refs: Vec<&MovieRecord> = movies.iter().collect();
        spec.sort(&mut refs);
        assert_eq!(slugs(&refs), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_default_order_is_desc() {
        let options = SearchOptions {
            sort: Some("_id".into()),
            ..SearchOptions::default()
        };
        let spec = SortSpec::from_options(&options).unwrap();
        assert_eq!(spec.field, SortField::Created);
        assert_eq!(spec.order, SortOrder::Desc);
    }
}
