//! # Request/Response Tracing

/// Build a `TraceLayer` for the verification API.
///
/// Each request gets a tracing span with method, URI, and status code;
/// 5xx responses are classified as failures.
pub fn layer() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
> {
    tower_http::trace::TraceLayer::new_for_http()
}
