//! Shared command setup: config resolution, secret source, store, input.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use paygate_core::{
    EnvSecretSource, ObjectStoreRecordStore, PaygateConfig, RecordStore, SecretSource,
};

pub struct Context {
    pub config: PaygateConfig,
    pub secrets: Arc<dyn SecretSource>,
}

impl Context {
    /// File (if any), then `PAYGATE_*` overrides, then validation.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => PaygateConfig::load(path)?,
            None => PaygateConfig::default(),
        };
        config.apply_env()?;
        config.validate()?;

        tracing::debug!(
            signing_secret = %config.auth.signing_secret,
            key_secret = %config.encryption.key_secret,
            store = %config.store.url,
            "config resolved"
        );

        Ok(Self {
            config,
            secrets: Arc::new(EnvSecretSource::new()),
        })
    }

    pub fn store(&self) -> anyhow::Result<Arc<dyn RecordStore>> {
        let spec = self.config.store_spec()?;
        if spec.is_memory() {
            tracing::warn!("memory store: records do not outlive this process");
        }
        let store = ObjectStoreRecordStore::from_spec(&spec)
            .with_context(|| format!("failed to open store {}", self.config.store.url))?;
        Ok(Arc::new(store))
    }
}

/// Read a file, or stdin for `-`.
pub fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source))
    }
}
