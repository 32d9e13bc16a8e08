//! Request-boundary validation shared by the HTTP server and the CLI.
//!
//! Validation runs before any store access; a failing request never
//! reaches the chat or indexing pipeline.

use serde::Serialize;
use thiserror::Error;

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// A rejected request field.
#[derive(Debug, Clone, Error, Serialize)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
