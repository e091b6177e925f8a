use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use super::error::{CryptoError, CryptoResult};

/// Key sizes accepted by AES (128, 192 and 256 bits).
pub const VALID_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// How key material is encoded inside the secret that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// The secret's UTF-8 bytes are the key.
    #[default]
    Raw,
    Base64,
    Hex,
}

impl FromStr for KeyEncoding {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            other => Err(CryptoError::KeyEncoding(format!(
                "unknown encoding '{}' (expected raw, base64 or hex)",
                other
            ))),
        }
    }
}

/// Symmetric data-encryption key.
///
/// Length is validated on construction. `Debug` never prints key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> CryptoResult<Self> {
        let bytes = bytes.into();
        if !VALID_KEY_LENGTHS.contains(&bytes.len()) {
            return Err(CryptoError::InvalidKey { len: bytes.len() });
        }
        Ok(Self { bytes })
    }

    /// Decode key material as delivered by a secret source.
    pub fn decode(material: &str, encoding: KeyEncoding) -> CryptoResult<Self> {
        let bytes = match encoding {
            KeyEncoding::Raw => material.as_bytes().to_vec(),
            KeyEncoding::Base64 => STANDARD
                .decode(material.trim())
                .map_err(|e| CryptoError::KeyEncoding(format!("base64: {}", e)))?,
            KeyEncoding::Hex => hex::decode(material.trim())
                .map_err(|e| CryptoError::KeyEncoding(format!("hex: {}", e)))?,
        };
        Self::from_bytes(bytes)
    }

    /// Generate a fresh random key of `bits` length from the OS CSPRNG.
    pub fn generate(bits: usize) -> CryptoResult<Self> {
        let len = bits / 8;
        if bits % 8 != 0 || !VALID_KEY_LENGTHS.contains(&len) {
            return Err(CryptoError::InvalidKey { len });
        }
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        Ok(Self { bytes })
    }

    /// Encode the key for provisioning into a secret store.
    ///
    /// `Raw` is lossy for random keys and is rejected; use `Base64` or `Hex`.
    pub fn encode(&self, encoding: KeyEncoding) -> CryptoResult<String> {
        match encoding {
            KeyEncoding::Base64 => Ok(STANDARD.encode(&self.bytes)),
            KeyEncoding::Hex => Ok(hex::encode(&self.bytes)),
            KeyEncoding::Raw => String::from_utf8(self.bytes.clone()).map_err(|_| {
                CryptoError::KeyEncoding("key bytes are not valid UTF-8".to_string())
            }),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bits(&self) -> usize {
        self.bytes.len() * 8
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey(<redacted>, {} bits)", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_accepts_aes_sizes() {
        for len in VALID_KEY_LENGTHS {
            let key = SymmetricKey::from_bytes(vec![1u8; len]).unwrap();
            assert_eq!(key.bits(), len * 8);
        }
    }

    #[test]
    fn test_from_bytes_rejects_other_sizes() {
        for len in [0, 1, 15, 17, 31, 33, 64] {
            assert_eq!(
                SymmetricKey::from_bytes(vec![1u8; len]),
                Err(CryptoError::InvalidKey { len })
            );
        }
    }

    #[test]
    fn test_decode_raw() {
        let key = SymmetricKey::decode("0123456789abcdef", KeyEncoding::Raw).unwrap();
        assert_eq!(key.as_bytes(), b"0123456789abcdef");
    }

    #[test]
    fn test_decode_hex_and_base64() {
        let hex_key = SymmetricKey::decode(&"ab".repeat(32), KeyEncoding::Hex).unwrap();
        assert_eq!(hex_key.bits(), 256);

        let b64 = STANDARD.encode([9u8; 24]);
        let b64_key = SymmetricKey::decode(&b64, KeyEncoding::Base64).unwrap();
        assert_eq!(b64_key.as_bytes(), &[9u8; 24]);
    }

    #[test]
    fn test_decode_bad_hex() {
        let err = SymmetricKey::decode("zz", KeyEncoding::Hex).unwrap_err();
        assert!(matches!(err, CryptoError::KeyEncoding(_)));
    }

    #[test]
    fn test_generate_is_random() {
        let a = SymmetricKey::generate(256).unwrap();
        let b = SymmetricKey::generate(256).unwrap();
        assert_eq!(a.bits(), 256);
        assert_ne!(a, b);
        assert!(SymmetricKey::generate(100).is_err());
    }

    #[test]
    fn test_encode_roundtrip() {
        let key = SymmetricKey::generate(128).unwrap();
        let encoded = key.encode(KeyEncoding::Base64).unwrap();
        assert_eq!(
            SymmetricKey::decode(&encoded, KeyEncoding::Base64).unwrap(),
            key
        );
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SymmetricKey::decode("0123456789abcdef", KeyEncoding::Raw).unwrap();
        let dbg = format!("{:?}", key);
        assert!(!dbg.contains("0123"));
        assert!(dbg.contains("128 bits"));
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("HEX".parse::<KeyEncoding>().unwrap(), KeyEncoding::Hex);
        assert!("rot13".parse::<KeyEncoding>().is_err());
    }
}
