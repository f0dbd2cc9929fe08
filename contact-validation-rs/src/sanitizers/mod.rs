//! Input sanitization utilities
//!
//! This module provides sanitization functions that clean raw request fields
//! before they are validated. Sanitizers are total: any input, including empty
//! or adversarial strings, produces a defined output.

pub mod field;
pub mod html;
pub mod string;

// Re-export all sanitizers for convenience
pub use field::*;
pub use html::*;
pub use string::*;

/// A single sanitization step over string input
pub type SanitizeStep = fn(&str) -> SanitizeResult<String>;

/// Sanitization result containing the sanitized content and information
/// about whether changes were made during sanitization
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeResult<T> {
    /// Sanitized content
    pub sanitized: T,
    /// Whether any changes were made during sanitization
    pub was_modified: bool,
    /// Optional details about what was modified
    pub details: Option<String>,
}

impl<T> SanitizeResult<T> {
    /// Create a result with unmodified content
    pub fn unmodified(content: T) -> Self {
        Self {
            sanitized: content,
            was_modified: false,
            details: None,
        }
    }

    /// Create a result with modified content
    pub fn modified(content: T, details: Option<String>) -> Self {
        Self {
            sanitized: content,
            was_modified: true,
            details,
        }
    }

    /// Consume the result and keep only the sanitized content
    pub fn into_inner(self) -> T {
        self.sanitized
    }
}

/// Run multiple sanitizers in sequence, accumulating modification details
pub fn chain_sanitizers(input: &str, steps: &[SanitizeStep]) -> SanitizeResult<String> {
    let mut result = SanitizeResult::unmodified(input.to_string());
    let mut all_details = Vec::new();

    for step in steps {
        let current = step(&result.sanitized);

        if current.was_modified {
            result.was_modified = true;
            if let Some(details) = current.details {
                all_details.push(details);
            }
        }

        result.sanitized = current.sanitized;
    }

    if !all_details.is_empty() {
        result.details = Some(all_details.join("; "));
    }

    result
}
