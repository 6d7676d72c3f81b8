//! The module contains the errors the engine can throw.
//!
//! - [`Validation`] rejects malformed or missing input before any mutation.
//! - [`StateConflict`] rejects a transition whose precondition no longer
//!   holds (for example approving an already-approved application).
//!
//! [`Validation`]: EngineError::Validation
//! [`StateConflict`]: EngineError::StateConflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[error("state conflict: {0}")]
    StateConflict(String),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Validation {
                    field: fa,
                    message: ma,
                },
                Self::Validation {
                    field: fb,
                    message: mb,
                },
            ) => fa == fb && ma == mb,
            (Self::StateConflict(a), Self::StateConflict(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
