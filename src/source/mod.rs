//! Remote movie source abstraction.
//!
//! The remote catalog is a paginated JSON API with no page-count guarantee.
//! Payloads come in a few shapes; everything that is not recognizable as a
//! list of movies decodes to an empty page.
//!
//! ```text
//! {"items": [...]}            latest listing
//! {"data": [...]}             older listing shape
//! {"data": {"items": [...]}}  advanced-search list
//! [...]                       bare array
//! ```

pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::index::SortSpec;
use crate::models::MovieRecord;

pub use http::HttpMovieSource;

/// One page of an advanced-search list, with whatever totals the API sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub items: Vec<MovieRecord>,
    pub total_items: Option<usize>,
    pub total_pages: Option<usize>,
}

/// Trait for remote catalog backends.
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// Fetch one page (1-based) of the latest-movies listing.
    async fn fetch_page(&self, page: usize) -> Result<Vec<MovieRecord>>;

    /// Fetch one page of an advanced-search list, sorted remotely.
    async fn fetch_list(
        &self,
        list_slug: &str,
        page: usize,
        sort: Option<SortSpec>,
    ) -> Result<ListPage>;
}

/// Pull the movie array out of a page payload.
pub fn extract_items(payload: &Value) -> Vec<MovieRecord> {
    let array = match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => match (map.get("items"), map.get("data")) {
            (Some(Value::Array(items)), _) => Some(items),
            (_, Some(Value::Array(items))) => Some(items),
            (_, Some(Value::Object(data))) => data.get("items").and_then(Value::as_array),
            _ => None,
        },
        _ => None,
    };

    let Some(array) = array else {
        log::debug!("Payload has no recognizable movie list");
        return Vec::new();
    };

    array
        .iter()
        .filter_map(|raw| match serde_json::from_value::<MovieRecord>(raw.clone()) {
            Ok(movie) if !movie.slug.trim().is_empty() => Some(movie),
            Ok(_) => {
                log::debug!("Skipping movie without slug");
                None
            }
            Err(e) => {
                log::debug!("Skipping undecodable movie: {}", e);
                None
            }
        })
        .collect()
}

/// Parse an advanced-search payload, including its pagination block.
pub fn extract_list_page(payload: &Value) -> ListPage {
    let pagination = payload
        .pointer("/data/params/pagination")
        .or_else(|| payload.pointer("/pagination"));

    let read = |key: &str| {
        pagination
            .and_then(|p| p.get(key))
            .and_then(Value::as_u64)
            .map(|v| v as usize)
    };

    ListPage {
        items: extract_items(payload),
        total_items: read("totalItems"),
        total_pages: read("totalPages"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_items_shapes() {
        let movie = json!({"slug": "a", "name": "A"});

        assert_eq!(extract_items(&json!({ "items": [movie] })).len(), 1);
        assert_eq!(extract_items(&json!({ "data": [movie] })).len(), 1);
        assert_eq!(extract_items(&json!({ "data": { "items": [movie] } })).len(), 1);
        assert_eq!(extract_items(&json!([movie, movie])).len(), 2);
    }

    #[test]
    fn test_unexpected_shapes_are_empty() {
        assert!(extract_items(&json!({ "status": false, "msg": "error" })).is_empty());
        assert!(extract_items(&json!({ "items": "nope" })).is_empty());
        assert!(extract_items(&json!("text")).is_empty());
        assert!(extract_items(&Value::Null).is_empty());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let payload = json!({
            "items": [
                {"slug": "ok", "name": "Ok"},
                {"name": "no slug"},
                {"slug": "bad-category", "category": "not a list"},
                42
            ]
        });

        let items = extract_items(&payload);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "ok");
    }

    #[test]
    fn test_list_page_pagination() {
        let payload = json!({
            "status": "success",
            "data": {
                "items": [{"slug": "x"}],
                "params": {
                    "pagination": {"totalItems": 1234, "totalItemsPerPage": 24, "currentPage": 2, "totalPages": 52}
                }
            }
        });

        let page = extract_list_page(&payload);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_items, Some(1234));
        assert_eq!(page.total_pages, Some(52));
    }
}
