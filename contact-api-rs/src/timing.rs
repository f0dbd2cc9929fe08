//! Request timing headers

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{SecondsFormat, Utc};
use std::time::Instant;

pub const X_REQUEST_START: HeaderName = HeaderName::from_static("x-request-start");
pub const X_RESPONSE_TIME: HeaderName = HeaderName::from_static("x-response-time");

/// Stamp each response with when the request arrived (RFC 3339, nanosecond
/// precision) and how long it took to handle.
pub async fn response_timing(req: Request, next: Next) -> Response {
    let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
    let start = Instant::now();

    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&started_at) {
        headers.insert(X_REQUEST_START, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{:?}", elapsed)) {
        headers.insert(X_RESPONSE_TIME, value);
    }
    response
}
