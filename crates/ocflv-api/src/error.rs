//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Verification failures return the bare per-path error map with 409; every
//! other error uses the [`ErrorBody`] envelope. Internal error details are
//! logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ocflv_core::{VerificationErrors, VerifyError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Verification ran and found problems (409).
    #[error("verification failed with {} error(s)", .0.len())]
    Verification(VerificationErrors),

    /// No inventory exists for the requested object (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Path id or request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Verification(_) => (StatusCode::CONFLICT, "VERIFICATION_FAILED"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let other = match self {
            Self::Verification(errors) => return (status, Json(errors)).into_response(),
            other => other,
        };

        // Never expose internal error messages to clients.
        let message = if let Self::Internal(_) = &other {
            tracing::error!(error = %other, "internal server error");
            "An internal error occurred".to_string()
        } else {
            other.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Failed(errors) => Self::Verification(errors),
            VerifyError::InventoryNotFound { .. } => Self::NotFound(err.to_string()),
            VerifyError::Inventory(_) | VerifyError::Store(_) | VerifyError::Task(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocflv_core::{InventoryError, StoreError, VerificationError};

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::Verification(VerificationErrors::new()), StatusCode::CONFLICT, "VERIFICATION_FAILED"),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err:?}");
        }
    }

    #[test]
    fn verify_error_mapping() {
        let mut errors = VerificationErrors::new();
        errors.insert("a.txt", VerificationError::not_found());
        assert!(matches!(
            AppError::from(VerifyError::Failed(errors)),
            AppError::Verification(e) if e.len() == 1
        ));
        assert!(matches!(
            AppError::from(VerifyError::InventoryNotFound { id: "7".into() }),
            AppError::NotFound(msg) if msg.contains('7')
        ));
        assert!(matches!(
            AppError::from(VerifyError::Inventory(InventoryError::EmptyHead)),
            AppError::Internal(_)
        ));
        assert!(matches!(
            AppError::from(VerifyError::Store(StoreError::Config("x".into()))),
            AppError::Internal(_)
        ));
        assert!(matches!(
            AppError::from(VerifyError::Task("panicked".into())),
            AppError::Internal(_)
        ));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    async fn response_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn into_response_verification_is_bare_map() {
        let mut errors = VerificationErrors::new();
        errors.insert("data/a.txt", VerificationError::mismatch("abc", "def"));
        errors.insert("data/b.txt", VerificationError::missing_input());

        let (status, body) = response_json(AppError::Verification(errors)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            serde_json::json!({
                "data/a.txt": { "error": "Checksums do not match", "expected": "abc", "actual": "def" },
                "data/b.txt": { "error": "Missing input checksum" }
            })
        );
    }

    #[tokio::test]
    async fn into_response_bad_request() {
        let (status, body) = response_json(AppError::BadRequest("malformed".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert!(body["error"]["message"].as_str().unwrap().contains("malformed"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) = response_json(AppError::Internal("bucket unreachable".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }
}
