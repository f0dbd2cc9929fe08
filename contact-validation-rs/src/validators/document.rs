//! CPF and CNPJ validators
//!
//! Both identifiers end in two verifier digits computed with a weighted sum
//! modulo 11 over the preceding digits. Validation strips every non-digit
//! first, so punctuation (and any other noise) is ignored.

use crate::sanitizers::strip_non_digits;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in a CPF
pub const CPF_LENGTH: usize = 11;

/// Number of digits in a CNPJ
pub const CNPJ_LENGTH: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Classification of a national identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "CPF")]
    Cpf,
    #[serde(rename = "CNPJ")]
    Cnpj,
    #[serde(rename = "invalid")]
    Invalid,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Cpf => "CPF",
            DocumentType::Cnpj => "CNPJ",
            DocumentType::Invalid => "invalid",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when every character equals the first one.
///
/// Vacuously true for the empty string.
pub fn is_all_same_digits(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => true,
    }
}

/// Map a weighted sum to its verifier digit
fn verifier_digit(sum: u32) -> u32 {
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

fn weighted_sum(digits: &[u32], weights: impl IntoIterator<Item = u32>) -> u32 {
    digits.iter().zip(weights).map(|(d, w)| d * w).sum()
}

/// Stripped digits as numeric values, or `None` if the length is wrong or
/// the digits are all identical
fn checked_digits(raw: &str, expected_len: usize) -> Option<Vec<u32>> {
    let digits = strip_non_digits(raw);
    if digits.len() != expected_len || is_all_same_digits(&digits) {
        return None;
    }
    digits.chars().map(|c| c.to_digit(10)).collect()
}

/// Validate a CPF (individual taxpayer number)
pub fn validate_cpf(raw: &str) -> bool {
    let Some(digits) = checked_digits(raw, CPF_LENGTH) else {
        return false;
    };

    let first = verifier_digit(weighted_sum(&digits[..9], (2..=10).rev()));
    if digits[9] != first {
        return false;
    }

    let second = verifier_digit(weighted_sum(&digits[..10], (2..=11).rev()));
    digits[10] == second
}

/// Validate a CNPJ (company taxpayer number)
pub fn validate_cnpj(raw: &str) -> bool {
    let Some(digits) = checked_digits(raw, CNPJ_LENGTH) else {
        return false;
    };

    let first = verifier_digit(weighted_sum(&digits[..12], CNPJ_FIRST_WEIGHTS));
    if digits[12] != first {
        return false;
    }

    let second = verifier_digit(weighted_sum(&digits[..13], CNPJ_SECOND_WEIGHTS));
    digits[13] == second
}

/// Format as `###.###.###-##`; any other length returns the stripped digits
pub fn format_cpf(raw: &str) -> String {
    let d = strip_non_digits(raw);
    if d.len() != CPF_LENGTH {
        return d;
    }
    format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..])
}

/// Format as `##.###.###/####-##`; any other length returns the stripped digits
pub fn format_cnpj(raw: &str) -> String {
    let d = strip_non_digits(raw);
    if d.len() != CNPJ_LENGTH {
        return d;
    }
    format!("{}.{}.{}/{}-{}", &d[..2], &d[2..5], &d[5..8], &d[8..12], &d[12..])
}

/// Validate a document as CPF or CNPJ depending on its digit count
pub fn validate_document(raw: &str) -> bool {
    let digits = strip_non_digits(raw);
    match digits.len() {
        CPF_LENGTH => validate_cpf(&digits),
        CNPJ_LENGTH => validate_cnpj(&digits),
        _ => false,
    }
}

/// Canonical punctuation for a CPF or CNPJ, by digit count
pub fn format_document(raw: &str) -> String {
    let digits = strip_non_digits(raw);
    match digits.len() {
        CPF_LENGTH => format_cpf(&digits),
        CNPJ_LENGTH => format_cnpj(&digits),
        _ => digits,
    }
}

/// Classify a document, returning `Invalid` unless its checksum holds
pub fn document_type(raw: &str) -> DocumentType {
    let digits = strip_non_digits(raw);
    match digits.len() {
        CPF_LENGTH if validate_cpf(&digits) => DocumentType::Cpf,
        CNPJ_LENGTH if validate_cnpj(&digits) => DocumentType::Cnpj,
        _ => DocumentType::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("11144477735", true ; "plain")]
    #[test_case("111.444.777-35", true ; "formatted")]
    #[test_case(" 111.444.777-35 ", true ; "padded")]
    #[test_case("12345678909", true ; "alternative")]
    #[test_case("11122233396", true ; "known valid")]
    #[test_case("111@444#777&35", true ; "noise is stripped")]
    #[test_case("111a444b777c35", true ; "letters are stripped")]
    #[test_case("00000000000", false ; "zeros")]
    #[test_case("11111111111", false ; "ones")]
    #[test_case("99999999999", false ; "nines")]
    #[test_case("123456789", false ; "too short")]
    #[test_case("1234567890123", false ; "too long")]
    #[test_case("", false ; "empty")]
    #[test_case("   ", false ; "only spaces")]
    #[test_case("abcdefghijk", false ; "only letters")]
    #[test_case("11144477736", false ; "wrong first verifier")]
    #[test_case("11144477734", false ; "wrong second verifier")]
    #[test_case("11144477799", false ; "both verifiers wrong")]
    fn test_validate_cpf(input: &str, expected: bool) {
        assert_eq!(validate_cpf(input), expected);
    }

    #[test_case("11222333000181", true ; "plain")]
    #[test_case("11.222.333/0001-81", true ; "formatted")]
    #[test_case(" 11.222.333/0001-81 ", true ; "padded")]
    #[test_case("12345678000195", true ; "alternative")]
    #[test_case("11444777000161", true ; "real")]
    #[test_case("11@222#333&0001$81", true ; "noise is stripped")]
    #[test_case("00000000000000", false ; "zeros")]
    #[test_case("22222222222222", false ; "twos")]
    #[test_case("123456789", false ; "too short")]
    #[test_case("123456789012345", false ; "too long")]
    #[test_case("", false ; "empty")]
    #[test_case("abcdefghijklmn", false ; "only letters")]
    #[test_case("11222333000182", false ; "wrong first verifier")]
    #[test_case("11222333000180", false ; "wrong second verifier")]
    #[test_case("11222333000199", false ; "both verifiers wrong")]
    fn test_validate_cnpj(input: &str, expected: bool) {
        assert_eq!(validate_cnpj(input), expected);
    }

    #[test]
    fn test_identical_digits_never_valid_cpf() {
        for d in '0'..='9' {
            let cpf: String = std::iter::repeat(d).take(CPF_LENGTH).collect();
            assert!(!validate_cpf(&cpf), "{} should be rejected", cpf);
        }
    }

    #[test]
    fn test_is_all_same_digits() {
        assert!(is_all_same_digits(""));
        assert!(is_all_same_digits("7"));
        assert!(is_all_same_digits("7777"));
        assert!(!is_all_same_digits("7778"));
    }

    #[test]
    fn test_verifier_digit_mapping() {
        assert_eq!(verifier_digit(22), 0); // remainder 0
        assert_eq!(verifier_digit(23), 0); // remainder 1
        assert_eq!(verifier_digit(24), 9); // remainder 2
        assert_eq!(verifier_digit(32), 1); // remainder 10
    }

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf("11144477735"), "111.444.777-35");
        assert_eq!(format_cpf("111.444.777-35"), "111.444.777-35");
        assert_eq!(format_cpf("123.456"), "123456");
    }

    #[test]
    fn test_format_cpf_is_idempotent_over_digits() {
        for cpf in ["11144477735", "12345678909", "52998224725"] {
            let formatted = format_cpf(cpf);
            assert_eq!(format_cpf(&strip_non_digits(&formatted)), formatted);
        }
    }

    #[test]
    fn test_format_cnpj() {
        assert_eq!(format_cnpj("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format_cnpj("11.222"), "11222");
    }

    #[test]
    fn test_validate_document_dispatch() {
        let inputs = [
            "11144477735",
            "11144477736",
            "11222333000181",
            "11222333000182",
            "123",
            "1234567890123",
            "",
        ];
        for input in inputs {
            let digits = strip_non_digits(input);
            let expected = match digits.len() {
                CPF_LENGTH => validate_cpf(input),
                CNPJ_LENGTH => validate_cnpj(input),
                _ => false,
            };
            assert_eq!(validate_document(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_format_document() {
        assert_eq!(format_document("11144477735"), "111.444.777-35");
        assert_eq!(format_document("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format_document("12-34"), "1234");
    }

    #[test]
    fn test_document_type() {
        assert_eq!(document_type("111.444.777-35"), DocumentType::Cpf);
        assert_eq!(document_type("11.222.333/0001-81"), DocumentType::Cnpj);
        assert_eq!(document_type("11144477736"), DocumentType::Invalid);
        assert_eq!(document_type("123"), DocumentType::Invalid);
        assert_eq!(DocumentType::Cnpj.to_string(), "CNPJ");
        assert_eq!(DocumentType::Invalid.to_string(), "invalid");
    }
}
