//! Deployment configuration.
//!
//! ```yaml
//! auth:
//!   signing_secret: JWT_SECRET_KEY
//!   required_scope: payment:process
//!   leeway_secs: 0
//!   principal:
//!     mode: fixed
//!     principal_id: user
//! encryption:
//!   key_secret: CARD_DATA_KEY
//!   key_encoding: raw
//! store:
//!   url: s3://card-vault/payments?region=eu-west-1
//! ```
//!
//! Only secret *names* live here. Values are resolved by a
//! [`SecretSource`](crate::secrets::SecretSource) per request.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{PrincipalMode, TokenPolicy, DEFAULT_SIGNING_SECRET, PAYMENT_PROCESS_SCOPE};
use crate::crypto::KeyEncoding;
use crate::store::StoreSpec;

pub const DEFAULT_KEY_SECRET: &str = "CARD_DATA_KEY";
pub const DEFAULT_STORE_URL: &str = "memory://";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {name}: {reason}")]
    InvalidOverride { name: &'static str, reason: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PaygateConfig {
    pub auth: AuthSection,
    pub encryption: EncryptionSection,
    pub store: StoreSection,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSection {
    /// Name of the token-signing secret.
    pub signing_secret: String,
    pub required_scope: String,
    pub leeway_secs: u64,
    pub principal: PrincipalMode,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            signing_secret: DEFAULT_SIGNING_SECRET.to_string(),
            required_scope: PAYMENT_PROCESS_SCOPE.to_string(),
            leeway_secs: 0,
            principal: PrincipalMode::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EncryptionSection {
    /// Name of the data-key secret.
    pub key_secret: String,
    pub key_encoding: KeyEncoding,
}

impl Default for EncryptionSection {
    fn default() -> Self {
        Self {
            key_secret: DEFAULT_KEY_SECRET.to_string(),
            key_encoding: KeyEncoding::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub url: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_string(),
        }
    }
}

impl PaygateConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults".
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply `PAYGATE_*` overrides. `lookup` returns the variable's value,
    /// if set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PAYGATE_SIGNING_SECRET") {
            self.auth.signing_secret = v;
        }
        if let Some(v) = lookup("PAYGATE_REQUIRED_SCOPE") {
            self.auth.required_scope = v;
        }
        if let Some(v) = lookup("PAYGATE_LEEWAY_SECS") {
            self.auth.leeway_secs =
                v.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidOverride {
                        name: "PAYGATE_LEEWAY_SECS",
                        reason: e.to_string(),
                    })?;
        }
        if let Some(v) = lookup("PAYGATE_KEY_SECRET") {
            self.encryption.key_secret = v;
        }
        if let Some(v) = lookup("PAYGATE_KEY_ENCODING") {
            self.encryption.key_encoding =
                v.parse().map_err(|e: crate::crypto::CryptoError| {
                    ConfigError::InvalidOverride {
                        name: "PAYGATE_KEY_ENCODING",
                        reason: e.to_string(),
                    }
                })?;
        }
        if let Some(v) = lookup("PAYGATE_STORE_URL") {
            self.store.url = v;
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.signing_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.signing_secret must name a secret".to_string(),
            ));
        }
        if self.encryption.key_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "encryption.key_secret must name a secret".to_string(),
            ));
        }
        if self.auth.signing_secret == self.encryption.key_secret {
            return Err(ConfigError::Invalid(format!(
                "token signing and data encryption must use different secrets (both are '{}')",
                self.auth.signing_secret
            )));
        }
        if self.auth.required_scope.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.required_scope must not be empty".to_string(),
            ));
        }
        if let PrincipalMode::Fixed { principal_id } = &self.auth.principal {
            if principal_id.is_empty() {
                return Err(ConfigError::Invalid(
                    "auth.principal.principal_id must not be empty".to_string(),
                ));
            }
        }
        self.store_spec()?;
        Ok(())
    }

    pub fn store_spec(&self) -> Result<StoreSpec, ConfigError> {
        StoreSpec::parse(&self.store.url).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn token_policy(&self) -> TokenPolicy {
        TokenPolicy {
            signing_secret: self.auth.signing_secret.clone(),
            required_scope: self.auth.required_scope.clone(),
            leeway: Duration::from_secs(self.auth.leeway_secs),
            principal: self.auth.principal.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = PaygateConfig::from_yaml_str("").unwrap();
        assert_eq!(cfg, PaygateConfig::default());
        assert_eq!(cfg.token_policy(), TokenPolicy::default());
        assert_eq!(cfg.encryption.key_secret, "CARD_DATA_KEY");
        assert!(cfg.store_spec().unwrap().is_memory());
        cfg.validate().unwrap();
    }

    #[test]
    fn test_full_yaml() {
        let cfg = PaygateConfig::from_yaml_str(
            r#"
auth:
  signing_secret: TOKEN_KEY
  required_scope: payment:refund
  leeway_secs: 30
  principal:
    mode: subject
encryption:
  key_secret: VAULT_KEY
  key_encoding: base64
store:
  url: s3://card-vault/payments?region=eu-west-1
"#,
        )
        .unwrap();

        let policy = cfg.token_policy();
        assert_eq!(policy.signing_secret, "TOKEN_KEY");
        assert_eq!(policy.required_scope, "payment:refund");
        assert_eq!(policy.leeway, Duration::from_secs(30));
        assert_eq!(policy.principal, PrincipalMode::Subject);
        assert_eq!(cfg.encryption.key_encoding, KeyEncoding::Base64);
        assert_eq!(
            cfg.store_spec().unwrap().bucket.as_deref(),
            Some("card-vault")
        );
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = PaygateConfig::from_yaml_str("store:\n  url: file:///tmp/cards\n").unwrap();
        assert_eq!(cfg.auth, AuthSection::default());
        assert_eq!(cfg.store.url, "file:///tmp/cards");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = PaygateConfig::from_yaml_str("auth:\n  algorithm: none\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_shared_secret_rejected() {
        let mut cfg = PaygateConfig::default();
        cfg.encryption.key_secret = cfg.auth.signing_secret.clone();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("different secrets"));
    }

    #[test]
    fn test_bad_store_url_rejected() {
        let mut cfg = PaygateConfig::default();
        cfg.store.url = "ftp://host/x".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PAYGATE_SIGNING_SECRET", "ALT_JWT"),
            ("PAYGATE_LEEWAY_SECS", "5"),
            ("PAYGATE_KEY_ENCODING", "HEX"),
            ("PAYGATE_STORE_URL", "file:///srv/cards"),
        ]
        .into_iter()
        .collect();

        let mut cfg = PaygateConfig::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(cfg.auth.signing_secret, "ALT_JWT");
        assert_eq!(cfg.auth.leeway_secs, 5);
        assert_eq!(cfg.auth.required_scope, PAYMENT_PROCESS_SCOPE);
        assert_eq!(cfg.encryption.key_encoding, KeyEncoding::Hex);
        assert_eq!(cfg.store.url, "file:///srv/cards");
    }

    #[test]
    fn test_bad_override_reports_variable() {
        let mut cfg = PaygateConfig::default();
        let err = cfg
            .apply_overrides(|k| (k == "PAYGATE_LEEWAY_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PAYGATE_LEEWAY_SECS"));
    }

    #[test]
    #[serial]
    fn test_apply_env() {
        std::env::set_var("PAYGATE_REQUIRED_SCOPE", "payment:capture");
        let mut cfg = PaygateConfig::default();
        let result = cfg.apply_env();
        std::env::remove_var("PAYGATE_REQUIRED_SCOPE");

        result.unwrap();
        assert_eq!(cfg.auth.required_scope, "payment:capture");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paygate.yaml");
        std::fs::write(&path, "encryption:\n  key_encoding: hex\n").unwrap();

        let cfg = PaygateConfig::load(&path).unwrap();
        assert_eq!(cfg.encryption.key_encoding, KeyEncoding::Hex);

        let err = PaygateConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
