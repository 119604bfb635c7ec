//! WebServer-specific error types

use orchestrator::OrchestratorError;
use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("HTTP server startup failed on {address}: {source}")]
    ServerStartupFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bind address: {details}")]
    InvalidAddress { details: String },

    #[error("Service wiring failed: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type WebServerResult<T> = Result<T, WebServerError>;
