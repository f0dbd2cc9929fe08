//! JSON envelopes shared by every endpoint

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri, Request},
    http::{request::Parts, Extensions, Method, Uri},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Machine-readable error codes
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
}

/// Path and method of the request being answered.
///
/// The path is taken from [`OriginalUri`] when present, so handlers inside a
/// nested router still report the full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub path: String,
    pub method: String,
}

impl RequestMeta {
    pub fn of(req: &Request) -> Self {
        Self::from_parts(req.method(), req.uri(), req.extensions())
    }

    fn from_parts(method: &Method, uri: &Uri, extensions: &Extensions) -> Self {
        let path = extensions
            .get::<OriginalUri>()
            .map(|OriginalUri(original)| original.path())
            .unwrap_or_else(|| uri.path());

        Self {
            path: path.to_string(),
            method: method.to_string(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(&parts.method, &parts.uri, &parts.extensions))
    }
}

/// One rejected field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

/// Body of every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Per-field failures when more than one field was rejected
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub method: String,
}

impl ErrorResponse {
    pub fn new(code: &str, error: impl Into<String>, meta: &RequestMeta) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            details: None,
            errors: Vec::new(),
            timestamp: Utc::now(),
            path: meta.path.clone(),
            method: meta.method.clone(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }
}

/// Body of successful responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

impl<T> SuccessResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            message: None,
            data: Some(data),
            total: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }
}
