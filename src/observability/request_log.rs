//! Request completion logging
//!
//! Emits one `REQUEST_COMPLETE` line per handled request. 5xx responses
//! are logged at WARN so they show up next to the matching `STORE_ERROR`.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use super::logger::{Logger, Severity};

/// axum middleware, install with `axum::middleware::from_fn(log_requests)`
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis().to_string();
    let severity = if status.is_server_error() {
        Severity::Warn
    } else {
        Severity::Info
    };

    Logger::log(
        severity,
        "REQUEST_COMPLETE",
        &[
            ("duration_ms", elapsed_ms.as_str()),
            ("method", method.as_str()),
            ("path", path.as_str()),
            ("status", status.as_str()),
        ],
    );

    response
}
