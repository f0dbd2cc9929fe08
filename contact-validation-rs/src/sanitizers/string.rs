//! String sanitization utilities
//!
//! This module provides the individual cleaning steps that the field
//! sanitizers are composed from.

use super::SanitizeResult;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref CONTROL_CHARS_REGEX: Regex =
        Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap();
    /// ASCII whitespace only; NBSP and other Unicode spaces are not separators
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"[\t\n\x0C\r ]+").unwrap();
    /// Anything that is not a letter (ASCII or Latin-1 accented), ASCII
    /// whitespace, hyphen or apostrophe
    static ref NON_NAME_CHARS_REGEX: Regex =
        Regex::new(r"[^a-zA-ZÀ-ÿ\t\n\x0C\r \-']").unwrap();
}

/// Remove control characters from a string
///
/// Tab, line feed and carriage return are kept.
pub fn remove_control_chars(input: &str) -> SanitizeResult<String> {
    let sanitized = CONTROL_CHARS_REGEX.replace_all(input, "");

    if sanitized == input {
        SanitizeResult::unmodified(input.to_string())
    } else {
        SanitizeResult::modified(
            sanitized.into_owned(),
            Some("Removed control characters".to_string()),
        )
    }
}

/// Trim whitespace from beginning and end
pub fn trim_whitespace(input: &str) -> SanitizeResult<String> {
    let trimmed = input.trim();

    if trimmed.len() == input.len() {
        SanitizeResult::unmodified(input.to_string())
    } else {
        SanitizeResult::modified(trimmed.to_string(), Some("Trimmed whitespace".to_string()))
    }
}

/// Collapse multiple whitespace characters into a single space
pub fn collapse_whitespace(input: &str) -> SanitizeResult<String> {
    let result = WHITESPACE_REGEX.replace_all(input, " ");

    if result == input {
        SanitizeResult::unmodified(input.to_string())
    } else {
        SanitizeResult::modified(result.into_owned(), Some("Collapsed whitespace".to_string()))
    }
}

/// Convert string to lowercase
pub fn to_lowercase(input: &str) -> SanitizeResult<String> {
    let result = input.to_lowercase();

    if result == input {
        SanitizeResult::unmodified(result)
    } else {
        SanitizeResult::modified(result, Some("Converted to lowercase".to_string()))
    }
}

/// Normalize Unicode text (NFC form)
///
/// Composes decomposed accents (`e` + U+0301) into a single code point so
/// they survive the Latin-1 name filter.
pub fn normalize_unicode(input: &str) -> SanitizeResult<String> {
    let normalized = input.nfc().collect::<String>();

    if normalized == input {
        SanitizeResult::unmodified(normalized)
    } else {
        SanitizeResult::modified(
            normalized,
            Some("Normalized Unicode characters".to_string()),
        )
    }
}

/// Remove everything that cannot appear in a person or company name
pub fn keep_name_chars(input: &str) -> SanitizeResult<String> {
    let result = NON_NAME_CHARS_REGEX.replace_all(input, "");

    if result == input {
        SanitizeResult::unmodified(input.to_string())
    } else {
        SanitizeResult::modified(
            result.into_owned(),
            Some("Removed characters not allowed in names".to_string()),
        )
    }
}

/// Remove everything except the ASCII digits `0`-`9`
pub fn strip_non_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}
