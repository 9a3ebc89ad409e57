//! Loading and query plumbing behind [`crate::MovieSearch`].
//!
//! - `crawl`: batched page fetches and the full-catalog crawl
//! - `loader`: snapshot, quick preload and full-crawl population
//! - `query_cache`: bounded TTL cache of query results

pub mod crawl;
pub mod loader;
pub mod query_cache;

pub use crawl::{CrawlOutcome, FullCrawler, StopReason};
pub use loader::{ExtraPages, LoadOutcome, Loader};
pub use query_cache::QueryCache;
