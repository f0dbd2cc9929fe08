//! # Contact Validation Library
//!
//! Sanitization and validation of CRM contact data before it is persisted.
//!
//! ## Features
//!
//! - Sanitizers that trim, HTML-escape and strip control characters
//! - CPF and CNPJ checksum validation, formatting and classification
//! - Brazilian phone validation against the DDD registry, formatting and
//!   mobile/landline classification
//! - Syntactic email validation
//! - Whole-contact normalization with per-field errors
//!
//! All validators and sanitizers are pure functions and safe to call from any
//! number of threads.

pub mod contact;
mod errors;
pub mod sanitizers;
pub mod validators;

pub use contact::{ContactInput, NormalizedContact};
pub use errors::{CompositeError, ValidationError, ValidationResult};

/// Re-export commonly used items for convenience
pub mod prelude {
    pub use crate::contact::{ContactInput, NormalizedContact};
    pub use crate::errors::{ValidationError, ValidationResult};
    pub use crate::sanitizers::{sanitize_email, sanitize_input, sanitize_name};
    pub use crate::validators::{
        document_type, format_brazilian_phone, format_cnpj, format_cpf, format_document,
        phone_type, validate_brazilian_phone, validate_cnpj, validate_cpf, validate_document,
        validate_email, DocumentType, PhoneType,
    };
}
