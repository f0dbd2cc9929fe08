//! Error handling for contact validation
//!
//! Field-level validation failures are reported as structured errors so the
//! HTTP layer can turn them into a response envelope without string parsing.
//! The low-level validators never produce these; they answer with booleans.

use std::fmt;
use thiserror::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Enum representing the ways a contact field can be rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty after sanitization
    #[error("{0} is required")]
    Required(String),

    /// Field length is outside the accepted bounds
    #[error("{field} must be between {min} and {max} characters (got {actual})")]
    Length {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    /// Email does not match the accepted pattern
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Document is neither a valid CPF nor a valid CNPJ
    #[error("invalid CPF/CNPJ: {0}")]
    InvalidDocument(String),

    /// Phone is not a valid Brazilian number
    #[error("invalid phone: {0}")]
    InvalidPhone(String),

    /// Composite validation error (multiple errors)
    #[error("{0}")]
    Composite(CompositeError),
}

/// Container for multiple validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeError {
    /// Collection of validation errors
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation errors: ", self.errors.len())?;

        for (idx, err) in self.errors.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }

        Ok(())
    }
}

impl ValidationError {
    /// Build a composite error from a collection of errors.
    ///
    /// A single error is returned as-is; an empty collection yields `None`.
    pub fn composite<I>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = ValidationError>,
    {
        let mut errors: Vec<ValidationError> = errors.into_iter().collect();
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ValidationError::Composite(CompositeError { errors })),
        }
    }

    /// Name of the contact field this error refers to, if it names exactly one
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::Required(field) => Some(field),
            ValidationError::Length { field, .. } => Some(field),
            ValidationError::InvalidEmail(_) => Some("email"),
            ValidationError::InvalidDocument(_) => Some("cpf_cnpj"),
            ValidationError::InvalidPhone(_) => Some("telefone"),
            ValidationError::Composite(_) => None,
        }
    }

    /// Flatten into the list of individual errors
    pub fn into_errors(self) -> Vec<ValidationError> {
        match self {
            ValidationError::Composite(composite) => composite.errors,
            other => vec![other],
        }
    }
}
