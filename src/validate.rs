//! Input validation run before a command is built.

use crate::error::{BoardError, BoardResult};

/// Trim `value` and reject it if nothing is left.
pub fn require_title(field: &'static str, value: &str) -> BoardResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::EmptyTitle { field });
    }
    Ok(trimmed.to_string())
}

/// Trim free-text content (reviews, reports) and reject it if empty.
pub fn require_content(field: &'static str, value: &str) -> BoardResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::EmptyContent { field });
    }
    Ok(trimmed.to_string())
}

/// Descriptions may be empty; they are only trimmed.
pub fn normalize_description(value: &str) -> String {
    value.trim().to_string()
}
