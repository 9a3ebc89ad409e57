//! In-process snapshot store.
//!
//! Keeps snapshots as serialized JSON in memory, so loads go through the
//! same decode and verify path as the filesystem store. Useful for
//! embedding without a writable directory, and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::MovieRecord;
use crate::storage::{PersistedSnapshot, SnapshotMetadata, SnapshotRef, SnapshotStore};

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under `name`, bypassing encoding.
    pub async fn put_raw(&self, name: &str, bytes: Vec<u8>) {
        self.entries.lock().await.insert(name.to_string(), bytes);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, name: &str) -> Result<Option<PersistedSnapshot>> {
        let entries = self.entries.lock().await;
        let Some(bytes) = entries.get(name) else {
            return Ok(None);
        };
        let snapshot: PersistedSnapshot =
            serde_json::from_slice(bytes).map_err(|e| AppError::corrupt(name, e))?;
        snapshot.verify(name)?;
        Ok(Some(snapshot))
    }

    async fn save(
        &self,
        name: &str,
        movies: &[MovieRecord],
        metadata: &SnapshotMetadata,
    ) -> Result<DateTime<Utc>> {
        let snapshot = SnapshotRef::new(movies, metadata)?;
        let bytes = serde_json::to_vec(&snapshot)?;
        self.entries.lock().await.insert(name.to_string(), bytes);
        Ok(snapshot.timestamp)
    }

    async fn clear_all(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}
