//! Object store implementation of RecordStore.
//!
//! Supports S3 and local filesystem via the `object_store` crate, plus an
//! in-memory backend for tests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{ObjectStore, ObjectStoreExt, PutMode, PutOptions, PutPayload};

use super::{KeyBuilder, RecordStore, StoreError, StoreResult, StoreSpec, StoredRecord};

/// Record store backed by `object_store`.
pub struct ObjectStoreRecordStore {
    inner: Arc<dyn ObjectStore>,
    keys: KeyBuilder,
}

impl ObjectStoreRecordStore {
    /// Wrap an existing object store handle.
    pub fn new(inner: Arc<dyn ObjectStore>, prefix: &str) -> Self {
        Self {
            inner,
            keys: KeyBuilder::new(prefix),
        }
    }

    /// Create a store from a parsed spec.
    pub fn from_spec(spec: &StoreSpec) -> StoreResult<Self> {
        let (inner, prefix): (Arc<dyn ObjectStore>, String) = match spec.scheme.as_str() {
            "memory" => (
                Arc::new(object_store::memory::InMemory::new()),
                spec.prefix.clone(),
            ),
            "file" => {
                let path = match &spec.bucket {
                    Some(host) => format!("/{}/{}", host, spec.prefix),
                    None => format!("/{}", spec.prefix),
                };
                std::fs::create_dir_all(&path).map_err(|e| StoreError::Io {
                    message: format!("failed to create store directory {}: {}", path, e),
                })?;
                let fs = object_store::local::LocalFileSystem::new_with_prefix(&path).map_err(
                    |e| StoreError::Io {
                        message: format!("failed to create local store at {}: {}", path, e),
                    },
                )?;
                // The filesystem root already is the prefix.
                (Arc::new(fs), String::new())
            }
            "s3" => {
                let bucket = spec
                    .bucket
                    .as_ref()
                    .ok_or_else(|| StoreError::InvalidSpec {
                        spec: format!("s3:///{}", spec.prefix),
                        reason: "S3 URL must include bucket name".to_string(),
                    })?;

                let mut builder = object_store::aws::AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .with_allow_http(false);
                if let Some(region) = &spec.region {
                    builder = builder.with_region(region);
                }

                let s3 = builder.build().map_err(|e| StoreError::Io {
                    message: format!("failed to create S3 client: {}", e),
                })?;
                (Arc::new(s3), spec.prefix.clone())
            }
            scheme => {
                return Err(StoreError::InvalidSpec {
                    spec: spec.scheme.clone(),
                    reason: format!("unsupported scheme: {}", scheme),
                })
            }
        };

        tracing::debug!(scheme = %spec.scheme, prefix = %prefix, "record store opened");
        Ok(Self::new(inner, &prefix))
    }

    /// Create a store from a URL string.
    pub fn from_url(url: &str) -> StoreResult<Self> {
        Self::from_spec(&StoreSpec::parse(url)?)
    }

    /// Create an in-memory store for testing.
    pub fn memory() -> Self {
        Self::new(Arc::new(object_store::memory::InMemory::new()), "")
    }
}

#[async_trait]
impl RecordStore for ObjectStoreRecordStore {
    async fn put(&self, record_id: &str, encoded_blob: &str) -> StoreResult<()> {
        let key = self.keys.record_key(record_id)?;
        let record = StoredRecord {
            card_id: record_id.to_string(),
            encrypted_data: encoded_blob.to_string(),
        };
        let body = serde_json::to_vec(&record).map_err(|e| StoreError::Other(e.into()))?;

        let opts = PutOptions {
            mode: PutMode::Overwrite,
            ..Default::default()
        };
        self.inner
            .put_opts(&key, PutPayload::from_bytes(Bytes::from(body)), opts)
            .await
            .map_err(|e| StoreError::from_object_store(e, record_id))?;

        tracing::debug!(record_id, key = %key, "record stored");
        Ok(())
    }

    async fn get(&self, record_id: &str) -> StoreResult<StoredRecord> {
        let key = self.keys.record_key(record_id)?;

        let result = self
            .inner
            .get(&key)
            .await
            .map_err(|e| StoreError::from_object_store(e, record_id))?;
        let bytes = result.bytes().await.map_err(|e| StoreError::Io {
            message: format!("failed to read record bytes: {}", e),
        })?;

        let record: StoredRecord =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                record_id: record_id.to_string(),
                message: e.to_string(),
            })?;
        if record.card_id != record_id {
            return Err(StoreError::Corrupt {
                record_id: record_id.to_string(),
                message: format!("stored card_id is '{}'", record.card_id),
            });
        }
        Ok(record)
    }
}
