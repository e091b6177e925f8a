//! Payment request handling.
//!
//! Flow:
//! 1. Parse `card_data` and `card_id` from the event body
//! 2. Reject record ids that cannot be storage keys
//! 3. Resolve the data key (fail closed)
//! 4. Encrypt `card_data` with a fresh IV
//! 5. Put the blob under `card_id`

use std::sync::Arc;

use super::{CardPayload, HandlerResponse, PaymentError, ProxyEvent, SUCCESS_MESSAGE};
use crate::crypto::{self, KeyEncoding, SymmetricKey};
use crate::secrets::SecretSource;
use crate::store::{validate_record_id, RecordStore};

/// Resolve and decode the data key named `name`.
pub fn resolve_data_key(
    secrets: &dyn SecretSource,
    name: &str,
    encoding: KeyEncoding,
) -> Result<SymmetricKey, PaymentError> {
    let material = secrets
        .resolve_non_empty(name)?
        .ok_or(PaymentError::MissingKey)?;
    Ok(SymmetricKey::decode(material.expose(), encoding)?)
}

pub struct PaymentHandler {
    store: Arc<dyn RecordStore>,
    secrets: Arc<dyn SecretSource>,
    key_secret: String,
    key_encoding: KeyEncoding,
}

impl PaymentHandler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        secrets: Arc<dyn SecretSource>,
        key_secret: impl Into<String>,
        key_encoding: KeyEncoding,
    ) -> Self {
        Self {
            store,
            secrets,
            key_secret: key_secret.into(),
            key_encoding,
        }
    }

    /// The key is read on every call so rotation takes effect without restart.
    pub fn data_key(&self) -> Result<SymmetricKey, PaymentError> {
        resolve_data_key(self.secrets.as_ref(), &self.key_secret, self.key_encoding)
    }

    /// Encrypt and persist one payload. Nothing is written unless every
    /// earlier step succeeded.
    pub async fn process(&self, payload: &CardPayload) -> Result<(), PaymentError> {
        validate_record_id(&payload.card_id)
            .map_err(|e| PaymentError::InvalidRecordId(e.to_string()))?;

        let key = self.data_key()?;
        let blob = crypto::encrypt(payload.card_data.as_bytes(), &key)?;

        self.store
            .put(&payload.card_id, &blob)
            .await
            .map_err(PaymentError::Storage)
    }

    /// Proxy-facing entry point. Never fails: errors become 400/500 responses.
    pub async fn handle(&self, event: &ProxyEvent) -> HandlerResponse {
        let result = match CardPayload::from_event(event) {
            Ok(payload) => self
                .process(&payload)
                .await
                .map(|()| payload.card_id),
            Err(e) => Err(e),
        };

        match result {
            Ok(card_id) => {
                tracing::info!(card_id = %card_id, "card data stored");
                HandlerResponse::ok(SUCCESS_MESSAGE)
            }
            Err(e) if e.is_client_error() => {
                tracing::warn!(error = %e, "payment request rejected");
                e.to_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "payment processing failed");
                e.to_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{KEY_FAILURE_MESSAGE, STORAGE_FAILURE_MESSAGE};
    use crate::secrets::StaticSecretSource;
    use crate::store::{ObjectStoreRecordStore, StoreError, StoreResult, StoredRecord};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn secrets(key: &str) -> Arc<StaticSecretSource> {
        Arc::new(StaticSecretSource::new().with("CARD_DATA_KEY", key))
    }

    fn handler_with(store: Arc<dyn RecordStore>, key: &str) -> PaymentHandler {
        PaymentHandler::new(store, secrets(key), "CARD_DATA_KEY", KeyEncoding::Raw)
    }

    fn event(card_id: &str, card_data: &str) -> ProxyEvent {
        ProxyEvent::json(&json!({"card_data": card_data, "card_id": card_id}))
    }

    struct FailingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn put(&self, record_id: &str, _encoded_blob: &str) -> StoreResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::from_object_store(
                object_store::Error::PermissionDenied {
                    path: "cards/card-1.json".to_string(),
                    source: "AccessDenied: arn:aws:iam::123456789012:role/app".into(),
                },
                record_id,
            ))
        }

        async fn get(&self, record_id: &str) -> StoreResult<StoredRecord> {
            Err(StoreError::NotFound {
                record_id: record_id.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_success_stores_decryptable_blob() {
        let store = Arc::new(ObjectStoreRecordStore::memory());
        let handler = handler_with(store.clone(), KEY);

        let resp = handler.handle(&event("card-1", "4111111111111111")).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body_json(), json!({"message": SUCCESS_MESSAGE}));

        let rec = store.get("card-1").await.unwrap();
        assert!(!rec.encrypted_data.contains("4111"));
        let key = handler.data_key().unwrap();
        let plain = crypto::decrypt(&rec.encrypted_data, &key).unwrap();
        assert_eq!(plain, b"4111111111111111");
    }

    #[tokio::test]
    async fn test_same_payload_twice_overwrites_with_new_iv() {
        let store = Arc::new(ObjectStoreRecordStore::memory());
        let handler = handler_with(store.clone(), KEY);

        handler.handle(&event("card-1", "4111")).await;
        let first = store.get("card-1").await.unwrap().encrypted_data;
        handler.handle(&event("card-1", "4111")).await;
        let second = store.get("card-1").await.unwrap().encrypted_data;

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_missing_field_is_400_and_nothing_written() {
        let store = Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        });
        let handler = handler_with(store.clone(), KEY);

        let resp = handler
            .handle(&ProxyEvent::json(&json!({"card_id": "card-1"})))
            .await;
        assert_eq!(resp.status_code, 400);
        assert!(resp.body_json()["error"].is_string());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_record_id_is_400() {
        let handler = handler_with(Arc::new(ObjectStoreRecordStore::memory()), KEY);
        let resp = handler.handle(&event("../../etc/passwd", "4111")).await;
        assert_eq!(resp.status_code, 400);
    }

    #[tokio::test]
    async fn test_missing_key_is_500_and_nothing_written() {
        let store = Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        });
        let handler = PaymentHandler::new(
            store.clone(),
            Arc::new(StaticSecretSource::new()),
            "CARD_DATA_KEY",
            KeyEncoding::Raw,
        );

        let resp = handler.handle(&event("card-1", "4111")).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body_json(), json!({"error": KEY_FAILURE_MESSAGE}));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_length_key_is_500() {
        let handler = handler_with(Arc::new(ObjectStoreRecordStore::memory()), "too-short");
        let resp = handler.handle(&event("card-1", "4111")).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body_json(), json!({"error": KEY_FAILURE_MESSAGE}));
    }

    #[tokio::test]
    async fn test_store_failure_is_500_without_backend_detail() {
        let store = Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        });
        let handler = handler_with(store.clone(), KEY);

        let resp = handler.handle(&event("card-1", "4111")).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body_json(), json!({"error": STORAGE_FAILURE_MESSAGE}));
        assert!(!resp.body.contains("arn:aws"));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hex_encoded_key() {
        let store = Arc::new(ObjectStoreRecordStore::memory());
        let hex_key = "000102030405060708090a0b0c0d0e0f";
        let handler = PaymentHandler::new(
            store.clone(),
            secrets(hex_key),
            "CARD_DATA_KEY",
            KeyEncoding::Hex,
        );

        let resp = handler.handle(&event("card-2", "5500")).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(handler.data_key().unwrap().bits(), 128);
    }

    #[tokio::test]
    async fn test_empty_card_data_is_accepted() {
        let store = Arc::new(ObjectStoreRecordStore::memory());
        let handler = handler_with(store.clone(), KEY);

        let resp = handler.handle(&event("card-3", "")).await;
        assert_eq!(resp.status_code, 200);
        let rec = store.get("card-3").await.unwrap();
        let plain = crypto::decrypt(&rec.encrypted_data, &handler.data_key().unwrap()).unwrap();
        assert!(plain.is_empty());
    }
}
