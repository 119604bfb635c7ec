//! Generator error types

use thiserror::Error;
use shared::ApiFailure;

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Generator error types
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("{provider} request failed during '{label}': {reason}")]
    ProviderError {
        provider: String,
        label: String,
        reason: ApiFailure,
    },

    #[error("{what} returned empty output")]
    EmptyOutput { what: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GeneratorError {
    pub fn empty(what: impl Into<String>) -> Self {
        GeneratorError::EmptyOutput { what: what.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        GeneratorError::InvalidInput { message: message.into() }
    }
}
