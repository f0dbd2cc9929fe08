//! HTML escaping
//!
//! Contact fields are stored as plain text and later rendered by clients we do
//! not control, so reserved HTML characters are escaped at the boundary.

use super::SanitizeResult;

/// Escape `&`, `<`, `>`, `"` and `'` as HTML entities.
///
/// Quotes use numeric entities (`&#34;`, `&#39;`). Runs in a single pass, so
/// an existing entity such as `&amp;` is escaped again rather than preserved.
pub fn encode_html_entities(input: &str) -> SanitizeResult<String> {
    let mut result = String::with_capacity(input.len());
    let mut was_modified = false;

    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&#34;"),
            '\'' => result.push_str("&#39;"),
            other => {
                result.push(other);
                continue;
            }
        }
        was_modified = true;
    }

    if was_modified {
        SanitizeResult::modified(result, Some("Encoded HTML entities".to_string()))
    } else {
        SanitizeResult::unmodified(result)
    }
}
