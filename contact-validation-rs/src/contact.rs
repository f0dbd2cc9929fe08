//! Contact record normalization
//!
//! Turns a raw contact payload into its canonical form: sanitized name and
//! email, punctuated document and phone. Two payloads describing the same
//! person therefore normalize to identical values, which is what makes
//! uniqueness checks on email and document meaningful downstream.

use crate::errors::{ValidationError, ValidationResult};
use crate::sanitizers::{sanitize_email, sanitize_input, sanitize_name};
use crate::validators::{
    document_type, format_brazilian_phone, format_document, phone_type, validate_brazilian_phone,
    validate_document, validate_email, DocumentType, PhoneType,
};
use serde::{Deserialize, Serialize};

/// Minimum name length, in characters
pub const NAME_MIN_LENGTH: usize = 2;

/// Maximum name length, in characters
pub const NAME_MAX_LENGTH: usize = 255;

/// JSON field names, shared with the request middleware
pub mod fields {
    pub const NAME: &str = "nome";
    pub const EMAIL: &str = "email";
    pub const DOCUMENT: &str = "cpf_cnpj";
    pub const PHONE: &str = "telefone";
}

/// Raw contact payload as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf_cnpj: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
}

/// Contact data in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedContact {
    pub nome: String,
    pub email: String,
    /// `###.###.###-##` or `##.###.###/####-##`
    pub cpf_cnpj: String,
    /// `(DD) NNNNN-NNNN` or `(DD) NNNN-NNNN`
    pub telefone: String,
}

impl NormalizedContact {
    pub fn document_type(&self) -> DocumentType {
        document_type(&self.cpf_cnpj)
    }

    pub fn phone_type(&self) -> PhoneType {
        phone_type(&self.telefone)
    }
}

/// Check a sanitized name against the length bounds
pub fn check_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Required(fields::NAME.to_string()));
    }

    let actual = name.chars().count();
    if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&actual) {
        return Err(ValidationError::Length {
            field: fields::NAME.to_string(),
            min: NAME_MIN_LENGTH,
            max: NAME_MAX_LENGTH,
            actual,
        });
    }

    Ok(())
}

/// Check a sanitized email
pub fn check_email(email: &str) -> ValidationResult<()> {
    if email.is_empty() {
        return Err(ValidationError::Required(fields::EMAIL.to_string()));
    }
    if !validate_email(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Check a sanitized CPF/CNPJ
pub fn check_document(document: &str) -> ValidationResult<()> {
    if document.is_empty() {
        return Err(ValidationError::Required(fields::DOCUMENT.to_string()));
    }
    if !validate_document(document) {
        return Err(ValidationError::InvalidDocument(document.to_string()));
    }
    Ok(())
}

/// Check a sanitized phone number
pub fn check_phone(phone: &str) -> ValidationResult<()> {
    if phone.is_empty() {
        return Err(ValidationError::Required(fields::PHONE.to_string()));
    }
    if !validate_brazilian_phone(phone) {
        return Err(ValidationError::InvalidPhone(phone.to_string()));
    }
    Ok(())
}

impl ContactInput {
    /// Sanitize every field, validate all of them and return the canonical
    /// contact.
    ///
    /// Every failing field is reported, not just the first one.
    pub fn sanitize_and_validate(&self) -> ValidationResult<NormalizedContact> {
        let nome = sanitize_name(self.nome.as_deref().unwrap_or_default());
        let email = sanitize_email(self.email.as_deref().unwrap_or_default());
        let cpf_cnpj = sanitize_input(self.cpf_cnpj.as_deref().unwrap_or_default());
        let telefone = sanitize_input(self.telefone.as_deref().unwrap_or_default());

        let errors: Vec<ValidationError> = [
            check_name(&nome),
            check_email(&email),
            check_document(&cpf_cnpj),
            check_phone(&telefone),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if let Some(err) = ValidationError::composite(errors) {
            log::debug!("Contact rejected: {}", err);
            return Err(err);
        }

        Ok(NormalizedContact {
            nome,
            email,
            cpf_cnpj: format_document(&cpf_cnpj),
            telefone: format_brazilian_phone(&telefone),
        })
    }
}
