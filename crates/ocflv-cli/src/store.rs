//! Object store flags shared by the subcommands that talk to the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ocflv_core::ObjectStore;
use ocflv_store::StoreConfig;

/// Store connection flags. Each falls back to its environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Base URL of the S3-compatible endpoint.
    #[arg(long, env = "OCFLV_STORE_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Bucket holding the preserved objects.
    #[arg(long, env = "OCFLV_STORE_BUCKET", global = true)]
    pub bucket: Option<String>,

    /// Bearer token for gateway-fronted buckets.
    #[arg(long, env = "OCFLV_STORE_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "OCFLV_STORE_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

impl StoreArgs {
    /// Build the store configuration from the flags.
    pub fn config(&self) -> Result<StoreConfig> {
        let endpoint = self
            .endpoint
            .as_deref()
            .context("--endpoint or OCFLV_STORE_ENDPOINT is required")?;
        let bucket = self
            .bucket
            .as_deref()
            .context("--bucket or OCFLV_STORE_BUCKET is required")?;

        let mut config = StoreConfig::new(endpoint, bucket)?;
        if let Some(token) = &self.token {
            config = config.with_token(token.as_str());
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }

    /// Connect to the configured store. A single CLI run has no use for the
    /// metadata cache.
    pub fn connect(&self) -> Result<Arc<dyn ObjectStore>> {
        let config = self.config()?;
        tracing::debug!(?config, "connecting to object store");
        Ok(ocflv_store::connect(&config, false)?)
    }
}
