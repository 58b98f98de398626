//! Local filesystem snapshot store.
//!
//! Used by the CLI when no bucket is configured, and by tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{SnapshotStore, decode_snapshot, encode_snapshot};

/// Snapshot kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct LocalSnapshotStore {
    path: PathBuf,
}

impl LocalSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::snapshot_read(self.location(), e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for LocalSnapshotStore {
    async fn load(&self) -> Result<Vec<String>> {
        match self.read_bytes().await? {
            Some(bytes) => {
                decode_snapshot(&bytes).map_err(|e| AppError::snapshot_read(self.location(), e))
            }
            None => {
                log::info!("No existing snapshot at {}", self.location());
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, urls: &[String]) -> Result<()> {
        let bytes = encode_snapshot(urls)?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::snapshot_write(self.location(), e))?;
        log::info!("Wrote {} urls to {}", urls.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path().join("known.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path().join("state/known.json"));

        store
            .save(&["https://x/items/1".to_string(), "https://x/items/2".to_string()])
            .await
            .unwrap();
        store.save(&["https://x/items/3".to_string()]).await.unwrap();

        assert_eq!(store.load().await.unwrap(), vec!["https://x/items/3"]);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "[\"https://x/items/3\"]\n");
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_load_collapses_repeated_urls() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("known.json");
        std::fs::write(&path, r#"["B","A","B","A"]"#).unwrap();

        let store = LocalSnapshotStore::new(path);
        assert_eq!(store.load().await.unwrap(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("known.json");
        std::fs::write(&path, "not json").unwrap();

        let store = LocalSnapshotStore::new(path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, AppError::SnapshotRead { .. }));
    }
}
