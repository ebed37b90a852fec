//! Object-store configuration.
//!
//! Loaded from environment variables by the binaries; tests construct it
//! directly or through [`StoreConfig::from_lookup`].

use url::Url;
use zeroize::Zeroizing;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for an S3-compatible, path-style endpoint.
///
/// Custom `Debug` implementation redacts the bearer token.
#[derive(Clone)]
pub struct StoreConfig {
    /// Base URL of the endpoint, e.g. `http://minio:9000`.
    pub endpoint: Url,
    /// Bucket holding the preserved objects.
    pub bucket: String,
    /// Optional bearer token for gateway-fronted buckets.
    pub token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StoreConfig {
    /// Configuration with no token and the default timeout.
    pub fn new(endpoint: &str, bucket: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_url("endpoint", endpoint)?,
            bucket: bucket.into(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `OCFLV_STORE_ENDPOINT` (required)
    /// - `OCFLV_STORE_BUCKET` (required)
    /// - `OCFLV_STORE_TOKEN` (optional)
    /// - `OCFLV_STORE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let endpoint = parse_url("OCFLV_STORE_ENDPOINT", &required("OCFLV_STORE_ENDPOINT")?)?;
        let bucket = required("OCFLV_STORE_BUCKET")?;
        if bucket.contains('/') {
            return Err(ConfigError::InvalidBucket(bucket));
        }
        let token = lookup("OCFLV_STORE_TOKEN")
            .filter(|value| !value.is_empty())
            .map(Zeroizing::new);
        let timeout_secs = match lookup("OCFLV_STORE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            endpoint,
            bucket,
            token,
            timeout_secs,
        })
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Zeroizing::new(token.into()));
        self
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("bucket name must not contain '/': {0}")]
    InvalidBucket(String),
    #[error("OCFLV_STORE_TIMEOUT_SECS must be a whole number of seconds: {0}")]
    InvalidTimeout(String),
}
