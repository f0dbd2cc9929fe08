//! Contact field sanitizers
//!
//! These are the entry points used before validation. Each one is a fixed
//! chain of the steps in [`super::string`] and [`super::html`].

use super::html::encode_html_entities;
use super::string::{
    collapse_whitespace, keep_name_chars, normalize_unicode, remove_control_chars, to_lowercase,
    trim_whitespace,
};
use super::{chain_sanitizers, SanitizeResult};

/// Trim, HTML-escape, then strip control characters.
///
/// The output never contains ASCII control characters other than tab, line
/// feed and carriage return, and never contains an unescaped `<`, `>`, `&`,
/// `"` or `'`.
pub fn sanitize_input(input: &str) -> String {
    let result = chain_sanitizers(
        input,
        &[trim_whitespace, encode_html_entities, remove_control_chars],
    );
    log_changes("input", &result);
    result.into_inner()
}

/// Sanitize a person or company name.
///
/// Runs [`sanitize_input`] first, so reserved characters are escaped before
/// the name filter removes punctuation. An `&` therefore ends up as the
/// letters `amp`, and an apostrophe disappears entirely.
pub fn sanitize_name(input: &str) -> String {
    let escaped = sanitize_input(input);
    let result = chain_sanitizers(
        &escaped,
        &[normalize_unicode, keep_name_chars, collapse_whitespace, trim_whitespace],
    );
    log_changes("name", &result);
    result.into_inner()
}

/// Sanitize an email address: [`sanitize_input`], lower-case, trim.
pub fn sanitize_email(input: &str) -> String {
    let escaped = sanitize_input(input);
    let result = chain_sanitizers(&escaped, &[to_lowercase, trim_whitespace]);
    log_changes("email", &result);
    result.into_inner()
}

fn log_changes(kind: &str, result: &SanitizeResult<String>) {
    if let Some(details) = &result.details {
        log::debug!("Sanitized {} field: {}", kind, details);
    }
}
