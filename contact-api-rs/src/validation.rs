//! Contact API Input Processing
//!
//! Sanitizes and validates the contact fields of JSON request bodies before
//! they reach a handler. Rejected requests never reach the handler; accepted
//! ones are forwarded with the sanitized values written back into the body.

use crate::error::ApiError;
use crate::response::RequestMeta;
use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use contact_validation::contact::{check_document, check_email, check_name, check_phone, fields};
use contact_validation::sanitizers::{sanitize_email, sanitize_input, sanitize_name};
use contact_validation::ValidationResult;
use serde_json::{Map, Value};

/// Maximum request payload size (1 MiB)
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

const INVALID_FORMAT: &str = "Invalid data format";

/// How one contact field is cleaned and checked
struct FieldRule {
    name: &'static str,
    sanitize: fn(&str) -> String,
    check: fn(&str) -> ValidationResult<()>,
}

const FIELD_RULES: [FieldRule; 4] = [
    FieldRule {
        name: fields::NAME,
        sanitize: sanitize_name,
        check: check_name,
    },
    FieldRule {
        name: fields::EMAIL,
        sanitize: sanitize_email,
        check: check_email,
    },
    FieldRule {
        name: fields::DOCUMENT,
        sanitize: sanitize_input,
        check: check_document,
    },
    FieldRule {
        name: fields::PHONE,
        sanitize: sanitize_input,
        check: check_phone,
    },
];

/// Generate middleware config for payload limits
pub fn payload_limit_config() -> tower_http::limit::RequestBodyLimitLayer {
    tower_http::limit::RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE)
}

/// Parse a request body that must be a JSON object
pub fn parse_payload(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest(INVALID_FORMAT.to_string())),
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not valid JSON");
            Err(ApiError::BadRequest(INVALID_FORMAT.to_string()))
        }
    }
}

/// Sanitize and check every contact field present in `payload` as a string,
/// writing the sanitized values back.
///
/// Stops at the first rejected field. Absent and non-string fields are left
/// for the handler to deal with.
pub fn process_contact_fields(payload: &mut Map<String, Value>) -> Result<(), ApiError> {
    for rule in &FIELD_RULES {
        if let Some(Value::String(raw)) = payload.get_mut(rule.name) {
            let sanitized = (rule.sanitize)(raw);
            (rule.check)(&sanitized)?;
            *raw = sanitized;
        }
    }
    Ok(())
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

async fn rewrite_body(req: Request) -> Result<Request, ApiError> {
    let (mut parts, body) = req.into_parts();

    let bytes = to_bytes(body, MAX_PAYLOAD_SIZE)
        .await
        .map_err(|_| ApiError::BadRequest(INVALID_FORMAT.to_string()))?;

    let mut payload = parse_payload(&bytes)?;
    process_contact_fields(&mut payload)?;

    let rewritten = serde_json::to_vec(&Value::Object(payload))
        .map_err(|e| ApiError::Internal(format!("failed to re-encode body: {}", e)))?;

    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(rewritten.len()));
    Ok(Request::from_parts(parts, Body::from(rewritten)))
}

/// Axum middleware; install with `middleware::from_fn`
pub async fn process_contact_input(req: Request, next: Next) -> Response {
    if !carries_body(req.method()) {
        return next.run(req).await;
    }

    let meta = RequestMeta::of(&req);
    match rewrite_body(req).await {
        Ok(req) => next.run(req).await,
        Err(err) => err.respond(&meta),
    }
}
