//! Request logging for the health router

use axum::Router;
use http::{Request, Response};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info_span, Span};

/// Wraps `router` in a `TraceLayer` that records method, path and latency.
///
/// A non-success status from the health route is an answer, not a server
/// fault, so responses are logged at `info` or `warn` and never `error`.
pub fn with_request_logging(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    version = ?request.version(),
                )
            })
            .on_request(|request: &Request<_>, _span: &Span| {
                tracing::debug!(
                    "started processing request {} {}",
                    request.method(),
                    request.uri().path()
                );
            })
            .on_response(|response: &Response<_>, latency: Duration, _span: &Span| {
                let status = response.status();
                let latency_ms = latency.as_millis() as u64;

                if status.is_success() {
                    tracing::info!(status = status.as_u16(), latency_ms, "request completed");
                } else {
                    tracing::warn!(status = status.as_u16(), latency_ms, "request completed with non-success status");
                }
            })
            .on_failure(()),
    )
}
