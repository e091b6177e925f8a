//! Encrypted record storage (Storage Writer).
//!
//! A thin put-by-key adapter over S3-compatible object storage. The core
//! never dedupes or merges: writing the same record id again overwrites.
//!
//! # Item shape
//!
//! ```text
//! {base_prefix}/cards/{record_id}.json
//! {"card_id": "<record_id>", "encrypted_data": "<base64(iv || ciphertext)>"}
//! ```

pub mod error;
pub mod naming;
pub mod object_store_backend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{StoreError, StoreResult};
pub use naming::{validate_record_id, KeyBuilder};
pub use object_store_backend::ObjectStoreRecordStore;

/// Parsed store specification from CLI/config.
///
/// ```text
/// s3://my-bucket/payments/cards?region=eu-west-1
/// file:///var/lib/paygate
/// memory://  (for testing)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSpec {
    /// The scheme (s3, file, memory)
    pub scheme: String,
    /// Bucket name (empty for file://)
    pub bucket: Option<String>,
    /// Base prefix/path within the bucket
    pub prefix: String,
    /// Optional region (for S3)
    pub region: Option<String>,
}

impl StoreSpec {
    /// Parse a store URL like `s3://bucket/prefix` or `file:///path`.
    pub fn parse(url: &str) -> StoreResult<Self> {
        let parsed = url::Url::parse(url).map_err(|e| StoreError::InvalidSpec {
            spec: url.to_string(),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme().to_string();
        if !matches!(scheme.as_str(), "memory" | "file" | "s3") {
            return Err(StoreError::InvalidSpec {
                spec: url.to_string(),
                reason: format!("unsupported scheme: {}", scheme),
            });
        }

        let bucket = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .map(|s| s.to_string());
        let prefix = parsed.path().trim_start_matches('/').to_string();
        let region = parsed
            .query_pairs()
            .find(|(k, _)| k == "region")
            .map(|(_, v)| v.to_string());

        Ok(Self {
            scheme,
            bucket,
            prefix,
            region,
        })
    }

    pub fn is_memory(&self) -> bool {
        self.scheme == "memory"
    }

    pub fn is_file(&self) -> bool {
        self.scheme == "file"
    }
}

/// The persisted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub card_id: String,
    pub encrypted_data: String,
}

/// Put-by-key storage for encrypted blobs.
///
/// Implementations must overwrite on an existing `record_id` and surface
/// backend failures without retrying.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist `encoded_blob` under `record_id`.
    async fn put(&self, record_id: &str, encoded_blob: &str) -> StoreResult<()>;

    /// Read a record back.
    ///
    /// # Returns
    ///
    /// - `Err(StoreError::NotFound)` if no record exists under `record_id`
    async fn get(&self, record_id: &str) -> StoreResult<StoredRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_spec() {
        let spec = StoreSpec::parse("s3://card-vault/payments/cards").unwrap();
        assert_eq!(spec.scheme, "s3");
        assert_eq!(spec.bucket, Some("card-vault".to_string()));
        assert_eq!(spec.prefix, "payments/cards");
    }

    #[test]
    fn test_parse_s3_with_region() {
        let spec = StoreSpec::parse("s3://card-vault/prefix?region=eu-west-1").unwrap();
        assert_eq!(spec.region, Some("eu-west-1".to_string()));
    }

    #[test]
    fn test_parse_file_spec() {
        let spec = StoreSpec::parse("file:///var/lib/paygate").unwrap();
        assert!(spec.is_file());
        assert!(spec.bucket.is_none());
        assert_eq!(spec.prefix, "var/lib/paygate");
    }

    #[test]
    fn test_parse_memory_spec() {
        let spec = StoreSpec::parse("memory://").unwrap();
        assert!(spec.is_memory());
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let err = StoreSpec::parse("ftp://host/path").unwrap_err();
        assert!(matches!(err, StoreError::InvalidSpec { .. }));
        assert!(StoreSpec::parse("not a url").is_err());
    }

    #[test]
    fn test_stored_record_shape() {
        let rec = StoredRecord {
            card_id: "card-1".to_string(),
            encrypted_data: "AAAA".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            serde_json::json!({"card_id": "card-1", "encrypted_data": "AAAA"})
        );
    }
}
