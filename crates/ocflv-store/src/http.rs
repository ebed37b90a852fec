//! S3-compatible HTTP object store.
//!
//! Objects are addressed path-style as `{endpoint}/{bucket}/{key}`, with each
//! key segment percent-encoded. Request signing is not performed; the
//! endpoint is expected to be reachable anonymously or through a gateway
//! that accepts a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use ocflv_core::{ObjectMetadata, ObjectStore, StoreError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ETAG};
use reqwest::{Response, StatusCode};
use url::Url;

use crate::config::StoreConfig;
use crate::retry::RetryPolicy;

/// Error bodies are truncated to this many characters.
const MAX_ERROR_BODY: usize = 512;

/// Read-only client for an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    http: reqwest::Client,
    endpoint: Url,
    bucket: String,
    retry: RetryPolicy,
}

impl HttpObjectStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| StoreError::Config("bearer token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            bucket: config.bucket.clone(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the default backoff for reads.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of the object under `key`.
    pub fn object_url(&self, key: &str) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config(format!("endpoint {} cannot be a base", self.endpoint)))?
            .pop_if_empty()
            .push(&self.bucket)
            .extend(key.split('/'));
        Ok(url)
    }
}

fn transport(key: &str, err: reqwest::Error) -> StoreError {
    StoreError::Transport {
        key: key.to_string(),
        message: err.to_string(),
    }
}

/// Map a non-success status onto the store error contract.
async fn check_status(key: &str, resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status {
        StatusCode::NOT_FOUND => Err(StoreError::NotFound { key: key.to_string() }),
        StatusCode::FORBIDDEN => Err(StoreError::AccessDenied { key: key.to_string() }),
        _ => {
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            Err(StoreError::Status {
                key: key.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: reqwest::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.object_url(key)?;
        tracing::debug!(key, "GET object");

        let resp = self
            .retry
            .send("GET", key, || self.http.get(url.clone()).send())
            .await
            .map_err(|e| transport(key, e))?;
        let resp = check_status(key, resp).await?;

        resp.bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| transport(key, e))
    }

    async fn head_metadata(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
        let url = self.object_url(key)?;
        tracing::debug!(key, "HEAD object");

        let resp = self
            .retry
            .send("HEAD", key, || self.http.head(url.clone()).send())
            .await
            .map_err(|e| transport(key, e))?;
        let resp = check_status(key, resp).await?;
        let headers = resp.headers();

        let content_digest = header_str(headers, ETAG)
            .ok_or_else(|| StoreError::InvalidResponse {
                key: key.to_string(),
                reason: "missing ETag header".to_string(),
            })?
            .to_string();

        Ok(ObjectMetadata {
            content_digest,
            content_length: header_str(headers, CONTENT_LENGTH).and_then(|v| v.parse().ok()),
            content_type: header_str(headers, CONTENT_TYPE).map(str::to_string),
        })
    }
}
