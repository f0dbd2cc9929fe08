//! API error type and its HTTP mapping

use crate::repository::RepositoryError;
use crate::response::{codes, ErrorResponse, FieldError, RequestMeta};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contact_validation::ValidationError;
use thiserror::Error;

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => codes::VALIDATION_ERROR,
            ApiError::BadRequest(_) => codes::BAD_REQUEST,
            ApiError::NotFound(_) => codes::NOT_FOUND,
            ApiError::Conflict(_) => codes::CONFLICT,
            ApiError::Internal(_) => codes::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope for this error
    pub fn to_body(&self, meta: &RequestMeta) -> ErrorResponse {
        match self {
            ApiError::Validation(err) => {
                let body = ErrorResponse::new(self.code(), summary(err), meta);
                let errors: Vec<FieldError> = err
                    .clone()
                    .into_errors()
                    .into_iter()
                    .map(|e| FieldError {
                        field: e.field().map(str::to_string),
                        message: e.to_string(),
                    })
                    .collect();
                body.with_details(err.to_string()).with_errors(errors)
            }
            // Internal details stay in the logs
            ApiError::Internal(_) => {
                ErrorResponse::new(self.code(), "Internal server error", meta)
            }
            other => ErrorResponse::new(other.code(), other.to_string(), meta),
        }
    }

    /// Log and render this error as a response for the request in `meta`
    pub fn respond(self, meta: &RequestMeta) -> Response {
        let status = self.status();
        let (path, method) = (&meta.path, &meta.method);
        if status.is_server_error() {
            tracing::error!(%path, %method, error = %self, "Request failed");
        } else {
            tracing::debug!(%path, %method, error = %self, "Request rejected");
        }

        (status, Json(self.to_body(meta))).into_response()
    }
}

/// Short message for a validation failure: "<field> is required",
/// "<field> is invalid", or the length bounds.
fn summary(err: &ValidationError) -> String {
    match err {
        ValidationError::Composite(_) => "Invalid contact data".to_string(),
        ValidationError::Required(_) | ValidationError::Length { .. } => err.to_string(),
        other => match other.field() {
            Some(field) => format!("{} is invalid", field),
            None => other.to_string(),
        },
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate { .. } => {
                ApiError::Conflict("Email or CPF/CNPJ already registered".to_string())
            }
            RepositoryError::NotFound(_) => ApiError::NotFound("Contact not found".to_string()),
        }
    }
}
