//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Every request gets an `http_request` span, a completion log line and
//! Prometheus samples. Metrics are labelled with the matched route template
//! (`/links/:key`, not `/links/sd`) so label cardinality stays bounded.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info_span, Instrument};

use super::metrics::METRICS;

/// Label used when no route matched.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Observability middleware for Axum.
///
/// Must wrap the whole router (applied with `Router::layer`) so that
/// [`MatchedPath`] is visible after routing.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %route,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_http_request(
            method.as_str(),
            &route,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}
