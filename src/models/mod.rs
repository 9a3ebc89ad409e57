// src/models/mod.rs

//! Domain models for the search index.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod config;
mod movie;
mod query;
mod report;

// Re-export all public types
pub use config::{
    CacheConfig, Config, LoaderConfig, LoggingConfig, SessionConfig, SourceConfig, StorageConfig,
};
pub use movie::{Facet, LooseNumber, MovieRecord, MovieType};
pub use query::{QueryStatus, SearchMode, SearchOptions, SearchResult, SearchStats};
pub use report::{CacheStatus, IndexStats, LoadOrigin, LoadReport, LoadingProgress};
