//! Movie record as returned by the remote catalog.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single catalog entry.
///
/// Only the fields the index looks at are typed. Everything else the API
/// sends is kept in `extra` and written back out untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    /// Unique identifier within the working set (dedup key)
    #[serde(default, deserialize_with = "null_default")]
    pub slug: String,

    /// Vietnamese title
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,

    /// Original-language title
    #[serde(default, deserialize_with = "null_default")]
    pub origin_name: String,

    /// Synopsis
    #[serde(default, deserialize_with = "null_default")]
    pub content: String,

    #[serde(default, deserialize_with = "null_default")]
    pub category: Vec<Facet>,

    #[serde(default, deserialize_with = "null_default")]
    pub country: Vec<Facet>,

    /// Release year, number or numeric string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<LooseNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_total: Option<LooseNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_current: Option<LooseNumber>,

    /// Pass-through fields (poster, thumbnails, modified time, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieRecord {
    /// Create a bare record with only a slug and a name.
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            origin_name: String::new(),
            content: String::new(),
            category: Vec::new(),
            country: Vec::new(),
            year: None,
            episode_total: None,
            episode_current: None,
            extra: Map::new(),
        }
    }

    /// Release year as an integer, if it parses as one.
    pub fn year_value(&self) -> Option<i64> {
        self.year.as_ref().and_then(LooseNumber::as_i64)
    }

    /// Classify the record as a series or a single (feature) movie.
    pub fn movie_type(&self) -> Option<MovieType> {
        let total = self.episode_total.as_ref().and_then(LooseNumber::as_f64);
        let current = self.episode_current.as_ref().and_then(LooseNumber::as_f64);

        if total.is_some_and(|t| t > 1.0) || current.is_some_and(|c| c > 1.0) {
            return Some(MovieType::Series);
        }
        match (total, current) {
            (Some(t), Some(c)) if t <= 1.0 && c <= 1.0 => Some(MovieType::Single),
            _ => None,
        }
    }

    /// Look up a nested string in the pass-through fields, e.g. `["modified", "time"]`.
    pub fn extra_str(&self, path: &[&str]) -> Option<&str> {
        let (first, rest) = path.split_first()?;
        let mut value = self.extra.get(*first)?;
        for key in rest {
            value = value.get(*key)?;
        }
        value.as_str()
    }

    /// Facet names for categories.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.category.iter().map(|f| f.name.as_str())
    }

    /// Facet names for countries.
    pub fn country_names(&self) -> impl Iterator<Item = &str> {
        self.country.iter().map(|f| f.name.as_str())
    }
}

/// A category or country tag attached to a movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Facet {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Facet {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// A value the API sends either as a JSON number or as a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(serde_json::Number),
    Text(String),
}

impl LooseNumber {
    /// Numeric value; strings are trimmed and parsed, anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Integer value, if the number has no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64)
    }

    /// Loose equality against user input: numeric when both sides parse,
    /// otherwise a trimmed string comparison.
    pub fn loosely_equals(&self, other: &str) -> bool {
        let other = other.trim();
        match (self.as_f64(), other.parse::<f64>().ok()) {
            (Some(a), Some(b)) => a == b,
            _ => match self {
                Self::Number(n) => n.to_string() == other,
                Self::Text(s) => s.trim() == other,
            },
        }
    }
}

impl From<i64> for LooseNumber {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Type filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieType {
    /// More than one episode
    Series,
    /// Feature film, at most one episode
    Single,
}

impl MovieType {
    /// Parse a filter value; unrecognized values mean "no type filter".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "series" => Some(Self::Series),
            "single" => Some(Self::Single),
            _ => None,
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
