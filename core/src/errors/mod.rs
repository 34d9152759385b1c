//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    /// User-correctable input problems, every violated rule listed
    #[error("Validation failed: {}", .errors.join(" "))]
    Validation { errors: Vec<String> },

    /// Store, signing or delivery failure; never shown to users verbatim
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Builds a validation error from collected messages
    pub fn validation<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DomainError::Validation {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an internal error with context
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
