//! Error types for field encryption.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised while encrypting or decrypting sensitive fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material does not match any supported AES key size.
    #[error("invalid key length: {len} bytes (expected 16, 24 or 32)")]
    InvalidKey { len: usize },

    /// Key material could not be decoded with the configured encoding.
    #[error("invalid key encoding: {0}")]
    KeyEncoding(String),

    /// Encoded blob is not base64 or has an impossible length.
    #[error("malformed blob: {0}")]
    MalformedBlob(String),

    /// Trailing pad bytes are inconsistent (wrong key or corrupted blob).
    #[error("invalid padding")]
    InvalidPadding,
}
