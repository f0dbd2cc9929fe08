//! Email validation
//!
//! Purely syntactic: no DNS lookup or mailbox check.

use crate::sanitizers::sanitize_email;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").unwrap();
}

/// Validate an email address after sanitizing and lower-casing it
pub fn validate_email(raw: &str) -> bool {
    EMAIL_REGEX.is_match(&sanitize_email(raw))
}
