//! # Application State
//!
//! Shared state handed to every handler: the verification engine over the
//! configured object store, the metrics registry when enabled, and the
//! process configuration.

use std::sync::Arc;

use ocflv_core::{ObjectStore, Verifier, DEFAULT_CONCURRENCY};

use crate::middleware::metrics::ApiMetrics;

/// Process configuration for the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Bound on concurrently running verification units per request.
    pub concurrency: usize,
    /// Whether object metadata lookups go through the process-wide cache.
    pub etag_cache: bool,
    /// Whether `/metrics` and the metrics middleware are mounted.
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            concurrency: DEFAULT_CONCURRENCY,
            etag_cache: true,
            metrics_enabled: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `OCFLV_VERIFY_CONCURRENCY` (default: 32)
    /// - `OCFLV_ETAG_CACHE` (default: enabled; `false` disables)
    /// - `OCFLV_METRICS_ENABLED` (default: enabled; `false` disables)
    pub fn from_env() -> Result<Self, AppConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            concurrency: parse_or(&lookup, "OCFLV_VERIFY_CONCURRENCY", defaults.concurrency)?,
            etag_cache: flag(&lookup, "OCFLV_ETAG_CACHE"),
            metrics_enabled: flag(&lookup, "OCFLV_METRICS_ENABLED"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, AppConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| AppConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

/// Enabled unless set to `false` (case-insensitive).
fn flag<F>(lookup: &F, name: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|v| v.trim().to_lowercase() != "false").unwrap_or(true)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Verifier<dyn ObjectStore>,
    pub metrics: Option<ApiMetrics>,
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("verifier", &self.verifier)
            .field("metrics", &self.metrics.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Build state over `store` with the given configuration.
    ///
    /// The store is used as given; callers decide whether to wrap it in a
    /// cache (see `ocflv_store::connect`).
    pub fn new(store: Arc<dyn ObjectStore>, config: AppConfig) -> Result<Self, prometheus::Error> {
        let metrics = if config.metrics_enabled {
            Some(ApiMetrics::new()?)
        } else {
            None
        };
        Ok(Self {
            verifier: Verifier::new(store).with_concurrency(config.concurrency),
            metrics,
            config,
        })
    }
}
