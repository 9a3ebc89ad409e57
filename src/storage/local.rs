//! Local filesystem snapshot store.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── movie-database.snapshot.json   # one file per snapshot name
//! └── ...
//! ```
//!
//! Writes go to a temp file first and are renamed into place, so a crash
//! mid-write never leaves a half-written snapshot behind. Only files with
//! the snapshot suffix belong to the store; anything else in the directory
//! is left alone.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::MovieRecord;
use crate::storage::{PersistedSnapshot, SnapshotMetadata, SnapshotRef, SnapshotStore};

const SNAPSHOT_SUFFIX: &str = ".snapshot.json";
const TEMP_SUFFIX: &str = ".snapshot.tmp";

/// Whether a file name was written by this store.
fn is_owned(file_name: &str) -> bool {
    file_name.ends_with(SNAPSHOT_SUFFIX) || file_name.ends_with(TEMP_SUFFIX)
}

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalSnapshotStore {
    root_dir: PathBuf,
}

impl LocalSnapshotStore {
    /// Create a new store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// File path for a snapshot name.
    fn path(&self, name: &str) -> PathBuf {
        self.root_dir.join(format!("{name}{SNAPSHOT_SUFFIX}"))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.write_bytes(path, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalSnapshotStore {
    async fn load(&self, name: &str) -> Result<Option<PersistedSnapshot>> {
        let Some(bytes) = self.read_bytes(&self.path(name)).await? else {
            log::debug!("No snapshot '{}' in {}", name, self.root_dir.display());
            return Ok(None);
        };

        let snapshot: PersistedSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| AppError::corrupt(name, e))?;
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
        let path = self.path(name);
        self.write_json(&path, &snapshot).await?;

        log::info!(
            "Snapshot '{}': {} movies written to {}",
            name,
            movies.len(),
            path.display()
        );
        Ok(snapshot.timestamp)
    }

    async fn clear_all(&self) -> Result<()> {
        let mut entries = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let owned = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_owned);
            if owned {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        log::info!(
            "Cleared {} snapshot file(s) from {}",
            removed,
            self.root_dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn movies() -> Vec<MovieRecord> {
        vec![MovieRecord::new("a", "A"), MovieRecord::new("b", "B")]
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path().join("cache"));
        let metadata = SnapshotMetadata {
            total_movies: 2,
            pages_crawled: 1,
            ..SnapshotMetadata::default()
        };

        store.save("movies", &movies(), &metadata).await.unwrap();
        let loaded = store.load("movies").await.unwrap().unwrap();

        assert_eq!(loaded.movies, movies());
        assert_eq!(loaded.metadata.total_movies, 2);
        assert!(loaded.age_secs() < 60);
    }

    #[tokio::test]
    async fn test_load_missing() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path());

        assert!(store.load("nope").await.unwrap().is_none());
        assert!(store.info("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_garbage_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path());
        store
            .write_bytes(&store.path("movies"), b"{not json")
            .await
            .unwrap();

        assert!(matches!(
            store.load("movies").await,
            Err(AppError::CorruptSnapshot { .. })
        ));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path());
        let metadata = SnapshotMetadata::default();

        store.save("one", &movies(), &metadata).await.unwrap();
        store.save("two", &movies(), &metadata).await.unwrap();
        store.clear_all().await.unwrap();

        assert!(store.load("one").await.unwrap().is_none());
        assert!(store.load("two").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_all_keeps_foreign_files() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path());
        let foreign = tmp.path().join("package.json");
        let notes = tmp.path().join("notes.tmp");
        std::fs::write(&foreign, b"{}").unwrap();
        std::fs::write(&notes, b"draft").unwrap();

        store
            .save("movie-database", &movies(), &SnapshotMetadata::default())
            .await
            .unwrap();
        assert!(tmp.path().join("movie-database.snapshot.json").exists());

        store.clear_all().await.unwrap();
        assert!(store.load("movie-database").await.unwrap().is_none());
        assert!(foreign.exists());
        assert!(notes.exists());
    }

    #[test]
    fn test_owned_file_names() {
        assert!(is_owned("movie-database.snapshot.json"));
        assert!(is_owned("movie-database.snapshot.tmp"));
        assert!(!is_owned("movie-database.json"));
        assert!(!is_owned("config.toml"));
    }

    #[tokio::test]
    async fn test_clear_missing_dir_is_ok() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path().join("never-created"));
        assert!(store.clear_all().await.is_ok());
    }
}
