//! Payment-processing handler: encrypt card data, then persist it.
//!
//! Sits behind the authorizer. Accepts a proxy event whose `body` is
//! `{"card_data": "...", "card_id": "..."}` and answers with
//! `{statusCode, body}`.

pub mod handler;

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::CryptoError;
use crate::secrets::SecretError;
use crate::store::StoreError;

pub use handler::PaymentHandler;

pub const SUCCESS_MESSAGE: &str = "Card data encrypted and stored successfully";
pub const STORAGE_FAILURE_MESSAGE: &str = "Error storing encrypted data";
pub const KEY_FAILURE_MESSAGE: &str = "Encryption key not configured";

/// Request as delivered by the proxy integration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ProxyEvent {
    pub fn json(body: &serde_json::Value) -> Self {
        Self {
            body: Some(body.to_string()),
            is_base64_encoded: false,
        }
    }
}

/// Sensitive input record. `Debug` never prints `card_data`.
#[derive(Clone, PartialEq, Eq)]
pub struct CardPayload {
    pub card_id: String,
    pub card_data: String,
}

impl CardPayload {
    pub fn from_event(event: &ProxyEvent) -> Result<Self, PaymentError> {
        let raw = event
            .body
            .as_deref()
            .ok_or_else(|| PaymentError::InvalidBody("missing body".to_string()))?;

        let value: serde_json::Value = if event.is_base64_encoded {
            let decoded = STANDARD
                .decode(raw)
                .map_err(|e| PaymentError::InvalidBody(format!("bad base64 body: {}", e)))?;
            serde_json::from_slice(&decoded)
        } else {
            serde_json::from_str(raw)
        }
        .map_err(|e| PaymentError::InvalidBody(e.to_string()))?;

        let obj = value
            .as_object()
            .ok_or_else(|| PaymentError::InvalidBody("body must be a JSON object".to_string()))?;

        let field = |name: &'static str| -> Result<String, PaymentError> {
            match obj.get(name) {
                None | Some(serde_json::Value::Null) => Err(PaymentError::MissingField(name)),
                Some(serde_json::Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(PaymentError::InvalidBody(format!(
                    "field '{}' must be a string",
                    name
                ))),
            }
        };

        Ok(Self {
            card_data: field("card_data")?,
            card_id: field("card_id")?,
        })
    }
}

impl fmt::Debug for CardPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardPayload")
            .field("card_id", &self.card_id)
            .field("card_data", &"<redacted>")
            .finish()
    }
}

/// Proxy response: JSON-encoded `body` plus HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            status_code: 200,
            body: serde_json::json!({ "message": message }).to_string(),
        }
    }

    pub fn error(status_code: u16, error: &str) -> Self {
        Self {
            status_code,
            body: serde_json::json!({ "error": error }).to_string(),
        }
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid card_id: {0}")]
    InvalidRecordId(String),

    #[error("encryption key secret is not set")]
    MissingKey,

    #[error("encryption key unusable: {0}")]
    Key(#[from] CryptoError),

    #[error("encryption key lookup failed: {0}")]
    Secret(#[from] SecretError),

    #[error("storage failed: {0}")]
    Storage(#[source] StoreError),
}

impl PaymentError {
    /// Problems with the request itself, as opposed to server-side state.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBody(_) | Self::MissingField(_) | Self::InvalidRecordId(_)
        )
    }

    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// Message safe to return to the caller. Backend causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingKey | Self::Key(_) | Self::Secret(_) => KEY_FAILURE_MESSAGE.to_string(),
            Self::Storage(_) => STORAGE_FAILURE_MESSAGE.to_string(),
            client => client.to_string(),
        }
    }

    pub fn to_response(&self) -> HandlerResponse {
        HandlerResponse::error(self.status_code(), &self.public_message())
    }
}
