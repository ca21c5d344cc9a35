//! Input normalization and the essay length gate.
//!
//! Every free-text form field passes through `sanitize` before it is stored
//! or embedded in a prompt. The word-count floor is configurable
//! (`MIN_WORD_COUNT`) and is enforced before any external call.

use crate::errors::AppError;

/// Characters never allowed through from free-text fields.
const DENYLIST: &[char] = &['<', '>', '&'];

/// Strips denylisted characters, collapses whitespace runs to single
/// spaces, and trims.
pub fn sanitize(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !DENYLIST.contains(c)).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `sanitize` plus a char-boundary-safe truncation.
pub fn sanitize_with_limit(raw: &str, max_chars: usize) -> String {
    let cleaned = sanitize(raw);
    truncate_chars(&cleaned, max_chars).to_string()
}

/// Truncates to at most `max` chars without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Word count = split on whitespace.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Rejects essays below the word floor with the user-facing Filipino
/// message. Callers must run this before issuing any LLM call.
pub fn ensure_min_words(text: &str, min: usize) -> Result<(), AppError> {
    if word_count(text) < min {
        return Err(AppError::Validation(format!(
            "Error: Ang input na teksto ay dapat magkaroon ng hindi bababa sa {min} salita."
        )));
    }
    Ok(())
}
