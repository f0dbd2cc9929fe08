//! Brazilian phone number validation
//!
//! Numbers are `DD` + subscriber digits, optionally prefixed by the country
//! code `55`. Mobile numbers have 11 digits and start their subscriber part
//! with `9`; landlines have 10 digits and may not start it with `0` or `1`.

use crate::sanitizers::strip_non_digits;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Brazil's international dialing code
pub const COUNTRY_CODE: &str = "55";

const MOBILE_LENGTH: usize = 11;
const LANDLINE_LENGTH: usize = 10;

lazy_static! {
    /// Area codes (DDD) in service
    static ref VALID_DDDS: HashSet<&'static str> = [
        "11", "12", "13", "14", "15", "16", "17", "18", "19",
        "21", "22", "24", "27", "28",
        "31", "32", "33", "34", "35", "37", "38",
        "41", "42", "43", "44", "45", "46", "47", "48", "49",
        "51", "53", "54", "55",
        "61", "62", "63", "64", "65", "66", "67", "68", "69",
        "71", "73", "74", "75", "77", "79",
        "81", "82", "83", "84", "85", "86", "87", "88", "89",
        "91", "92", "93", "94", "95", "96", "97", "98", "99",
    ]
    .into_iter()
    .collect();
}

/// Classification of a phone number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneType {
    Mobile,
    Landline,
    Invalid,
}

impl PhoneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneType::Mobile => "mobile",
            PhoneType::Landline => "landline",
            PhoneType::Invalid => "invalid",
        }
    }
}

impl fmt::Display for PhoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip everything but digits
pub fn sanitize_phone(raw: &str) -> String {
    strip_non_digits(raw)
}

/// Whether a two-digit area code is in the registry
pub fn is_valid_ddd(ddd: &str) -> bool {
    VALID_DDDS.contains(ddd)
}

/// Digits with one leading country code removed
fn national_digits(raw: &str) -> String {
    let digits = sanitize_phone(raw);
    match digits.strip_prefix(COUNTRY_CODE) {
        Some(rest) => rest.to_string(),
        None => digits,
    }
}

fn is_valid_national(digits: &str) -> bool {
    if digits.len() != LANDLINE_LENGTH && digits.len() != MOBILE_LENGTH {
        return false;
    }

    if !is_valid_ddd(&digits[..2]) {
        return false;
    }

    let marker = digits.as_bytes()[2];
    if digits.len() == MOBILE_LENGTH {
        marker == b'9'
    } else {
        marker != b'0' && marker != b'1'
    }
}

/// Validate a Brazilian phone number, with or without country code and
/// punctuation
pub fn validate_brazilian_phone(raw: &str) -> bool {
    is_valid_national(&national_digits(raw))
}

/// Format as `(DD) NNNNN-NNNN` or `(DD) NNNN-NNNN`.
///
/// Other lengths come back as bare digits. The number is not validated.
pub fn format_brazilian_phone(raw: &str) -> String {
    let d = national_digits(raw);
    match d.len() {
        MOBILE_LENGTH => format!("({}) {}-{}", &d[..2], &d[2..7], &d[7..]),
        LANDLINE_LENGTH => format!("({}) {}-{}", &d[..2], &d[2..6], &d[6..]),
        _ => d,
    }
}

/// Classify a phone number as mobile, landline or invalid
pub fn phone_type(raw: &str) -> PhoneType {
    let digits = national_digits(raw);
    if !is_valid_national(&digits) {
        return PhoneType::Invalid;
    }

    match digits.len() {
        MOBILE_LENGTH => PhoneType::Mobile,
        _ => PhoneType::Landline,
    }
}
