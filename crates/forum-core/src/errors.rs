//! Cross-cutting error types for the forum.
//!
//! Store-specific errors (`DatabaseError`) live in `forum-db`, and the HTTP
//! mapping lives in `forum-web` where all crate errors converge.

use thiserror::Error;

/// Errors that can be raised by any forum crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Input failed validation. `field` names the offending form field.
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a validation failure on a named field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
