//! # ocflv-api: HTTP Surface for OCFL Inventory Verification
//!
//! ## API Surface
//!
//! | Route                        | Module                | Purpose                         |
//! |------------------------------|-----------------------|---------------------------------|
//! | `POST /verify/{id}`          | [`routes::verify`]    | Ingest verification             |
//! | `POST /verify/{id}/update`   | [`routes::verify`]    | Update verification             |
//! | `GET /openapi.json`          | [`openapi`]           | Generated OpenAPI document      |
//! | `GET /health/liveness`       | this module           | Process is up                   |
//! | `GET /health/readiness`      | this module           | Ready to accept traffic         |
//! | `GET /metrics`               | this module           | Prometheus scrape endpoint      |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → BodyLimit → Handler
//! ```

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Maximum accepted request body size.
pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// The metrics middleware and `/metrics` are mounted only when
/// `state.metrics` is present.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let mut router = Router::new()
        .merge(routes::verify::router())
        .merge(openapi::router())
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

    if let Some(metrics) = metrics {
        router = router
            .route("/metrics", get(prometheus_metrics))
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics));
    }

    router
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ready"
}

/// GET /metrics: Prometheus text exposition.
async fn prometheus_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
