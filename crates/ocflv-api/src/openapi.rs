//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented verification routes into a single
//! OpenAPI document served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the verification API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ocflv: OCFL Inventory Verification",
        description = "Verifies objects held in an OCFL-layout object store against caller-supplied digests.\n\n- `POST /verify/{id}` checks every path in the head version (ingest).\n- `POST /verify/{id}/update` checks only the supplied paths, resolving them through version history (update).\n\nA failed verification answers 409 with a map from logical path to its error.",
        license(name = "Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::verify::verify_ingest,
        crate::routes::verify::verify_update,
    ),
    components(
        schemas(
            crate::routes::verify::ChecksumInput,
            crate::routes::verify::PathError,
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
        ),
    ),
    tags(
        (name = "verification", description = "Ingest and update verification of stored objects"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates_with_crate_version() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "ocflv: OCFL Inventory Verification");
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn spec_has_verify_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/verify/{id}"));
        assert!(spec.paths.paths.contains_key("/verify/{id}/update"));
    }

    #[test]
    fn spec_registers_schemas() {
        let spec = ApiDoc::openapi();
        let schemas = &spec.components.as_ref().unwrap().schemas;
        for name in ["ChecksumInput", "PathError", "ErrorBody"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
