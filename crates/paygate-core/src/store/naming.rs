//! Key naming for encrypted card records.
//!
//! ```text
//! {base_prefix}/cards/{record_id}.json
//! ```
//!
//! Record ids are validated, not rewritten: two distinct ids must never map
//! to the same key.

use object_store::path::Path;

use super::error::{StoreError, StoreResult};

const MAX_RECORD_ID_LEN: usize = 256;

/// Builder for storage keys.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    base_prefix: String,
}

impl KeyBuilder {
    pub fn new(base_prefix: impl Into<String>) -> Self {
        let prefix = base_prefix.into().trim_matches('/').to_string();
        Self {
            base_prefix: prefix,
        }
    }

    /// Key for a record. Returns `{base}/cards/{record_id}.json`.
    pub fn record_key(&self, record_id: &str) -> StoreResult<Path> {
        validate_record_id(record_id)?;
        Ok(if self.base_prefix.is_empty() {
            Path::from(format!("cards/{}.json", record_id))
        } else {
            Path::from(format!("{}/cards/{}.json", self.base_prefix, record_id))
        })
    }
}

/// Record ids: 1..=256 chars of `[A-Za-z0-9._:-]`, not `.` or `..`.
pub fn validate_record_id(record_id: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidRecordId {
        record_id: record_id.to_string(),
        reason: reason.to_string(),
    };

    if record_id.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if record_id.len() > MAX_RECORD_ID_LEN {
        return Err(invalid("longer than 256 characters"));
    }
    if record_id == "." || record_id == ".." {
        return Err(invalid("reserved path segment"));
    }
    if let Some(c) = record_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
    {
        return Err(invalid(&format!("character {:?} not allowed", c)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key() {
        let kb = KeyBuilder::new("payments/prod");
        let key = kb.record_key("card-0001").unwrap();
        assert_eq!(key.as_ref(), "payments/prod/cards/card-0001.json");
    }

    #[test]
    fn test_record_key_no_prefix() {
        let kb = KeyBuilder::new("/");
        let key = kb.record_key("card-0001").unwrap();
        assert_eq!(key.as_ref(), "cards/card-0001.json");
    }

    #[test]
    fn test_rejects_unsafe_ids() {
        for id in ["", ".", "..", "a/b", "a b", "card#1", "ümlaut", "a\nb"] {
            let err = validate_record_id(id).unwrap_err();
            assert!(err.is_client_error(), "{:?} should be rejected", id);
        }
        assert!(validate_record_id(&"x".repeat(257)).is_err());
        assert!(validate_record_id(&"x".repeat(256)).is_ok());
    }

    #[test]
    fn test_distinct_ids_never_collide() {
        let kb = KeyBuilder::new("");
        assert_ne!(
            kb.record_key("a_b").unwrap(),
            kb.record_key("a-b").unwrap()
        );
        assert!(kb.record_key("a/b").is_err());
    }
}
