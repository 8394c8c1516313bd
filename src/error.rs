//! Structured errors for board operations.
//!
//! Only input problems are errors. A command aimed at a task or child that no
//! longer exists is not an error; the reducer treats it as a no-op.

use serde::Serialize;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    EmptyTitle,
    EmptyContent,

    // Image ingestion errors
    UnsupportedImageType,
    ImageTooLarge,
    ImageUnreadable,
}

/// Error surfaced to the user before a command is dispatched.
#[derive(Debug, Error, Serialize, PartialEq, Eq)]
pub enum BoardError {
    #[error("{field} is required")]
    EmptyTitle { field: &'static str },

    #[error("{field} cannot be empty")]
    EmptyContent { field: &'static str },

    #[error("Please select a valid image file ({allowed})")]
    UnsupportedImageType { allowed: String },

    #[error("Image size must be less than {limit}")]
    ImageTooLarge { size: u64, limit: String },

    #[error("Failed to read the image file: {reason}")]
    ImageUnreadable { reason: String },
}

impl BoardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BoardError::EmptyTitle { .. } => ErrorCode::EmptyTitle,
            BoardError::EmptyContent { .. } => ErrorCode::EmptyContent,
            BoardError::UnsupportedImageType { .. } => ErrorCode::UnsupportedImageType,
            BoardError::ImageTooLarge { .. } => ErrorCode::ImageTooLarge,
            BoardError::ImageUnreadable { .. } => ErrorCode::ImageUnreadable,
        }
    }

    pub fn unreadable(err: impl std::fmt::Display) -> Self {
        BoardError::ImageUnreadable {
            reason: err.to_string(),
        }
    }
}

/// Result type for board operations.
pub type BoardResult<T> = std::result::Result<T, BoardError>;
