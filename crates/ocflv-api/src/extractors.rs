//! # Request Extraction Helpers
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and path segments as raw
//! strings so that every malformed request maps to [`AppError::BadRequest`].

use axum::extract::rejection::JsonRejection;
use axum::Json;
use ocflv_core::ObjectId;

use crate::error::AppError;

/// Extract a JSON body, mapping any rejection to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Parse the `{id}` path segment as a numeric object id.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("object id must be numeric, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_parses() {
        assert_eq!(parse_object_id("1254624").unwrap(), ObjectId(1254624));
    }

    #[test]
    fn non_numeric_id_is_bad_request() {
        for raw in ["abc", "-1", "12.5", ""] {
            assert!(matches!(parse_object_id(raw), Err(AppError::BadRequest(_))), "{raw}");
        }
    }
}
