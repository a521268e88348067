//! Pasted text.

use super::SourceError;

/// Accept user-supplied text, trimmed. Blank input is rejected.
pub fn accept(text: &str) -> Result<String, SourceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SourceError::EmptyText);
    }
    Ok(trimmed.to_string())
}
