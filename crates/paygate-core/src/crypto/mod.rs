//! Encryption at rest for sensitive card fields.
//!
//! AES-CBC (128/192/256 by key length) with PKCS#7 padding and a fresh
//! random IV per call. Output is a single base64 string carrying the IV
//! followed by the ciphertext.

pub mod aes_cbc;
pub mod error;
pub mod key;

pub use aes_cbc::{decrypt, encrypt, open, seal, EncryptedBlob, BLOCK_LEN, IV_LEN};
pub use error::{CryptoError, CryptoResult};
pub use key::{KeyEncoding, SymmetricKey, VALID_KEY_LENGTHS};
