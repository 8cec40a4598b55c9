//! # Error Types
//!
//! This module defines error types used throughout the datamerge library.
//!
//! Every failure is local and non-fatal: a handler reports it as a status
//! message and the editor state stays as it was before the action.

use thiserror::Error;

/// Main error type for datamerge operations
#[derive(Debug, Error)]
pub enum DataMergeError {
    /// Input validation (no file selected, wrong file type, skipped step)
    #[error("{0}")]
    Validation(String),

    /// Render service answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Collaborator { status: u16, message: String },

    /// Response body was not the JSON we expected
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// An image URL could not be fetched or decoded
    #[error("Resource load error: {0}")]
    ResourceLoad(String),

    /// Connection-level HTTP failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataMergeError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        DataMergeError::Validation(message.into())
    }
}

impl From<reqwest::Error> for DataMergeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DataMergeError::MalformedResponse(e.to_string())
        } else {
            DataMergeError::Transport(e.to_string())
        }
    }
}
