//! Secret sources.
//!
//! Secrets are resolved by name at call time, never cached by the caller.
//! A missing secret is a configuration problem, reported as `Ok(None)`.

use std::collections::HashMap;
use std::env;
use std::fmt;

use thiserror::Error;

/// Errors from a secret source that could not answer at all.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret '{name}' is not valid UTF-8")]
    NotUnicode { name: String },

    #[error("secret source unavailable: {0}")]
    Unavailable(String),
}

/// A resolved secret. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(<redacted>)")
    }
}

/// Named secret lookup.
pub trait SecretSource: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Option<SecretValue>, SecretError>;

    /// Like [`resolve`](Self::resolve), but treats an empty value as absent.
    fn resolve_non_empty(&self, name: &str) -> Result<Option<SecretValue>, SecretError> {
        Ok(self.resolve(name)?.filter(|v| !v.is_empty()))
    }
}

/// Reads secrets from process environment variables at call time.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretSource {
    prefix: Option<String>,
}

impl EnvSecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` to every looked-up name (e.g. `PAYGATE_`).
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn var_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{}{}", p, name),
            None => name.to_string(),
        }
    }
}

impl SecretSource for EnvSecretSource {
    fn resolve(&self, name: &str) -> Result<Option<SecretValue>, SecretError> {
        let var = self.var_name(name);
        match env::var(&var) {
            Ok(v) => Ok(Some(SecretValue::new(v))),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(SecretError::NotUnicode { name: var }),
        }
    }
}

/// Fixed in-memory secrets, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretSource {
    values: HashMap<String, SecretValue>,
}

impl StaticSecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), SecretValue::new(value));
        self
    }
}

impl SecretSource for StaticSecretSource {
    fn resolve(&self, name: &str) -> Result<Option<SecretValue>, SecretError> {
        Ok(self.values.get(name).cloned())
    }
}
