//! # Verification Routes
//!
//! - `POST /verify/{id}`       : ingest verification (every head path must match)
//! - `POST /verify/{id}/update`: update verification (only the supplied paths)
//!
//! Both take a JSON object mapping logical paths to expected digests and
//! answer 200 with an empty body on success, or 409 with the per-path error
//! map.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use ocflv_core::{VerifyError, VerifyMode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_json, parse_object_id};
use crate::state::AppState;

/// Assemble the verification router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify/{id}", post(verify_ingest))
        .route("/verify/{id}/update", post(verify_update))
}

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

/// Expected digests keyed by logical path, e.g.
/// `{"data/400000254.txt": "f19d6b3e8a7c0245"}`.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ChecksumInput(pub HashMap<String, String>);

/// One path's failure inside a 409 response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PathError {
    /// Failure description, e.g. "Checksums do not match".
    pub error: String,
    /// Digest supplied by the caller (mismatches only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Digest reported by the object store (mismatches only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /verify/{id}: ingest verification.
#[utoipa::path(
    post,
    path = "/verify/{id}",
    params(
        ("id" = u64, Path, description = "Numeric object id")
    ),
    request_body = ChecksumInput,
    responses(
        (status = 200, description = "Every head path matched its supplied digest"),
        (status = 409, description = "Per-path verification errors", body = HashMap<String, PathError>),
        (status = 404, description = "No inventory for the object", body = crate::error::ErrorBody),
        (status = 400, description = "Malformed id or request body", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
async fn verify_ingest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ChecksumInput>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    run(&state, VerifyMode::Ingest, &id, body).await
}

/// POST /verify/{id}/update: update verification.
#[utoipa::path(
    post,
    path = "/verify/{id}/update",
    params(
        ("id" = u64, Path, description = "Numeric object id")
    ),
    request_body = ChecksumInput,
    responses(
        (status = 200, description = "Every supplied path matched"),
        (status = 409, description = "Per-path verification errors", body = HashMap<String, PathError>),
        (status = 404, description = "No inventory for the object", body = crate::error::ErrorBody),
        (status = 400, description = "Malformed id or request body", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
async fn verify_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ChecksumInput>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    run(&state, VerifyMode::Update, &id, body).await
}

async fn run(
    state: &AppState,
    mode: VerifyMode,
    raw_id: &str,
    body: Result<Json<ChecksumInput>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let parsed = parse_object_id(raw_id).and_then(|id| extract_json(body).map(|input| (id, input)));
    let (id, ChecksumInput(expected)) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            record(state, mode, "bad_request");
            return Err(err);
        }
    };

    let outcome = state.verifier.verify(mode, id, expected).await;
    record(state, mode, outcome_label(&outcome));
    outcome.map(|()| StatusCode::OK).map_err(AppError::from)
}

fn outcome_label(outcome: &Result<(), VerifyError>) -> &'static str {
    match outcome {
        Ok(()) => "passed",
        Err(VerifyError::Failed(_)) => "failed",
        Err(VerifyError::InventoryNotFound { .. }) => "not_found",
        Err(_) => "error",
    }
}

fn record(state: &AppState, mode: VerifyMode, result: &str) {
    if let Some(metrics) = &state.metrics {
        metrics.record_verification(mode.as_str(), result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocflv_core::{StoreError, VerificationErrors};

    #[test]
    fn checksum_input_is_a_bare_object() {
        let input: ChecksumInput =
            serde_json::from_str(r#"{"data/a.txt": "abc", "data/b.txt": "def"}"#).unwrap();
        assert_eq!(input.0.len(), 2);
        assert_eq!(input.0["data/a.txt"], "abc");
    }

    #[test]
    fn nested_values_are_rejected() {
        let parsed: Result<ChecksumInput, _> =
            serde_json::from_str(r#"{"descriptor/mets.xml": {"data/a.doc": "abc"}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(outcome_label(&Ok(())), "passed");
        assert_eq!(
            outcome_label(&Err(VerifyError::Failed(VerificationErrors::new()))),
            "failed"
        );
        assert_eq!(
            outcome_label(&Err(VerifyError::InventoryNotFound { id: "1".into() })),
            "not_found"
        );
        assert_eq!(
            outcome_label(&Err(VerifyError::Store(StoreError::Config("x".into())))),
            "error"
        );
    }
}
