// src/lib.rs

//! Phim Search Library
//!
//! In-memory search over a remote movie catalog: staged loading (snapshot,
//! quick preload, full crawl), filtered and paginated queries with a short
//! lived result cache, and a durable snapshot of the crawled catalog.

pub mod error;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod session;
pub mod source;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AppError, Result};
pub use service::MovieSearch;
pub use session::{SearchSession, SessionQuery};
