// src/pipeline/query_cache.rs

//! Bounded result cache with per-entry time-to-live.
//!
//! Entries expire lazily: a stale entry is dropped when it is looked up,
//! and every insert sweeps expired entries before evicting the oldest one
//! when the cache is full.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::SearchResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: SearchResult,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<String, CacheEntry>,
    max_entries: usize,
}

impl QueryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<SearchResult> {
        self.get_at(key, Instant::now())
    }

    /// Fresh result for `key` as of `now`; a stale entry is removed.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<SearchResult> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(now) {
            return Some(entry.result.clone());
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&mut self, key: String, result: SearchResult, ttl: Duration) {
        self.insert_at(key, result, ttl, Instant::now());
    }

    pub fn insert_at(&mut self, key: String, result: SearchResult, ttl: Duration, now: Instant) {
        if ttl.is_zero() {
            return;
        }

        self.entries.retain(|_, entry| entry.is_fresh(now));
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                result,
                stored_at: now,
                ttl,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
