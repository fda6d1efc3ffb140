//! Domain-specific error types and error handling.

use thiserror::Error;

/// Core domain errors
///
/// `NotFound` is an ordinary negative outcome; `Storage` and `TokenGeneration`
/// are failures the caller must surface as "try again" / "unavailable".
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Token generation failed: {message}")]
    TokenGeneration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl DomainError {
    /// Not-found error for an OTP addressed by id, email, or token
    pub fn otp_not_found() -> Self {
        DomainError::NotFound {
            resource: "otp".to_string(),
        }
    }

    /// Storage error from any displayable backend error
    pub fn storage(error: impl std::fmt::Display) -> Self {
        DomainError::Storage {
            message: error.to_string(),
        }
    }

    /// Check whether this is the expected "nothing here" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// Check whether the backing store failed
    pub fn is_storage(&self) -> bool {
        matches!(self, DomainError::Storage { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
