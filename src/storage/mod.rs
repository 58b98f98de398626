//! Storage abstractions for the known-URL snapshot.
//!
//! A snapshot is a UTF-8 JSON array of strings, e.g.
//!
//! ```text
//! ["https://site/items/1","https://site/items/2"]
//! ```
//!
//! Reading a missing snapshot yields an empty list (first run). Older
//! writers appended to the list, so decoding sorts and drops repeats. Writing
//! replaces whatever was stored before; there is no versioning or merge.

pub mod local;
#[cfg(feature = "aws")]
pub mod s3;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Config, SnapshotLocation};

// Re-export for convenience
pub use local::LocalSnapshotStore;
#[cfg(feature = "aws")]
pub use s3::S3SnapshotStore;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored URLs, or an empty list if nothing is stored yet.
    async fn load(&self) -> Result<Vec<String>>;

    /// Replace the stored URLs.
    async fn save(&self, urls: &[String]) -> Result<()>;

    /// Human-readable location for logs and errors.
    fn location(&self) -> String;
}

/// Decode a stored snapshot body into a sorted list without duplicates.
pub fn decode_snapshot(bytes: &[u8]) -> serde_json::Result<Vec<String>> {
    let urls: BTreeSet<String> = serde_json::from_slice(bytes)?;
    Ok(urls.into_iter().collect())
}

/// Encode URLs in the stored snapshot format.
pub fn encode_snapshot(urls: &[String]) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec(urls)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Open the store the configuration points at.
pub async fn open_store(config: &Config) -> Result<Arc<dyn SnapshotStore>> {
    match config.snapshot.location()? {
        SnapshotLocation::Local(path) => Ok(Arc::new(LocalSnapshotStore::new(path))),
        #[cfg(feature = "aws")]
        SnapshotLocation::S3 { bucket, key } => {
            Ok(Arc::new(S3SnapshotStore::from_env(bucket, key).await))
        }
        #[cfg(not(feature = "aws"))]
        SnapshotLocation::S3 { bucket, key } => Err(crate::error::AppError::config(format!(
            "s3://{bucket}/{key} requires the `aws` feature"
        ))),
    }
}
