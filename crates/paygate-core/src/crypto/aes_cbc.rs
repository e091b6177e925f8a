//! AES-CBC encryption of sensitive fields.
//!
//! Blob layout (before base64):
//!
//! ```text
//! | iv (16 bytes) | ciphertext (n * 16 bytes, n >= 1) |
//! ```
//!
//! The IV travels with its ciphertext; it is never stored separately.
//! Padding is PKCS#7: block-aligned input gets a full extra block, so the
//! pad length is always recoverable from the last byte.

use aes::{Aes128, Aes192, Aes256};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};

use super::error::{CryptoError, CryptoResult};
use super::key::SymmetricKey;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// IV length in bytes (one block).
pub const IV_LEN: usize = 16;

/// IV plus ciphertext, as produced by [`seal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Single opaque string: `base64(iv || ciphertext)`.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        raw.extend_from_slice(&self.iv);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }

    pub fn decode(encoded: &str) -> CryptoResult<Self> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::MalformedBlob(format!("not base64: {}", e)))?;

        if raw.len() < IV_LEN + BLOCK_LEN || (raw.len() - IV_LEN) % BLOCK_LEN != 0 {
            return Err(CryptoError::MalformedBlob(format!(
                "length {} is not iv + whole blocks",
                raw.len()
            )));
        }

        let (iv, ciphertext) = raw.split_at(IV_LEN);
        let mut iv_bytes = [0u8; IV_LEN];
        iv_bytes.copy_from_slice(iv);

        Ok(Self {
            iv: iv_bytes,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Encrypt `plaintext` under `key` and return the encoded blob.
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> CryptoResult<String> {
    seal(plaintext, key).map(|blob| blob.encode())
}

/// Decrypt an encoded blob produced by [`encrypt`].
pub fn decrypt(encoded: &str, key: &SymmetricKey) -> CryptoResult<Vec<u8>> {
    open(&EncryptedBlob::decode(encoded)?, key)
}

/// Encrypt with a fresh IV drawn from the OS CSPRNG.
pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> CryptoResult<EncryptedBlob> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    seal_with_iv(plaintext, key, iv)
}

pub fn open(blob: &EncryptedBlob, key: &SymmetricKey) -> CryptoResult<Vec<u8>> {
    let k = key.as_bytes();
    let iv = &blob.iv;
    let ct = blob.ciphertext.as_slice();

    match k.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(k, iv)
            .map_err(|_| CryptoError::InvalidKey { len: k.len() })?
            .decrypt_padded_vec_mut::<Pkcs7>(ct),
        24 => cbc::Decryptor::<Aes192>::new_from_slices(k, iv)
            .map_err(|_| CryptoError::InvalidKey { len: k.len() })?
            .decrypt_padded_vec_mut::<Pkcs7>(ct),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(k, iv)
            .map_err(|_| CryptoError::InvalidKey { len: k.len() })?
            .decrypt_padded_vec_mut::<Pkcs7>(ct),
        len => return Err(CryptoError::InvalidKey { len }),
    }
    .map_err(|_| CryptoError::InvalidPadding)
}

// Callers outside tests must go through `seal` so the IV is always fresh.
pub(crate) fn seal_with_iv(
    plaintext: &[u8],
    key: &SymmetricKey,
    iv: [u8; IV_LEN],
) -> CryptoResult<EncryptedBlob> {
    let k = key.as_bytes();

    let ciphertext = match k.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(k, &iv)
            .map_err(|_| CryptoError::InvalidKey { len: k.len() })?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        24 => cbc::Encryptor::<Aes192>::new_from_slices(k, &iv)
            .map_err(|_| CryptoError::InvalidKey { len: k.len() })?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(k, &iv)
            .map_err(|_| CryptoError::InvalidKey { len: k.len() })?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        len => return Err(CryptoError::InvalidKey { len }),
    };

    Ok(EncryptedBlob { iv, ciphertext })
}
