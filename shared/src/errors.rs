//! Shared error types for the autopilot workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Unknown error kind: {input}")]
    UnknownErrorKind { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
