//! AWS S3 snapshot store.
//!
//! The snapshot lives at a single `{bucket}/{key}` object that is read once
//! and overwritten at most once per run.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::storage::{SnapshotStore, decode_snapshot, encode_snapshot};

/// S3-based snapshot storage.
#[derive(Clone)]
pub struct S3SnapshotStore {
    client: Client,
    bucket: String,
    key: String,
}

impl S3SnapshotStore {
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create a store using the ambient AWS configuration.
    pub async fn from_env(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket, key)
    }
}

#[async_trait]
impl SnapshotStore for S3SnapshotStore {
    async fn load(&self) -> Result<Vec<String>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::snapshot_read(self.location(), e))?;
                decode_snapshot(&bytes.into_bytes())
                    .map_err(|e| AppError::snapshot_read(self.location(), e))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::info!("No existing snapshot at {}", self.location());
                    Ok(Vec::new())
                } else {
                    Err(AppError::snapshot_read(self.location(), service_err))
                }
            }
        }
    }

    async fn save(&self, urls: &[String]) -> Result<()> {
        let body = ByteStream::from(encode_snapshot(urls)?);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(body)
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::snapshot_write(self.location(), e.into_service_error()))?;

        log::info!("Wrote {} urls to {}", urls.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
