//! Orchestrator-specific error types

use std::path::PathBuf;
use thiserror::Error;

use generator::GeneratorError;
use shared::{ApiFailure, ErrorKind, SharedError, WorkflowStage};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Item list at {source_name} contains no items")]
    EmptyList { source_name: String },

    #[error("State store {operation} failed on {}: {source}", .path.display())]
    StateStoreError {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to acquire lock {}: {message}", .path.display())]
    LockError { path: PathBuf, message: String },

    #[error("{stage} produced an empty result: {what}")]
    EmptyStageOutput { stage: WorkflowStage, what: String },

    #[error("{stage} failed: {source}")]
    StageFailed {
        stage: WorkflowStage,
        #[source]
        source: GeneratorError,
    },

    #[error("Graph API {operation} failed: {reason}")]
    GraphApiError { operation: String, reason: ApiFailure },

    #[error("Token bootstrap required: {message}")]
    TokenBootstrapRequired { message: String },

    #[error("Token refresh failed: {message}")]
    TokenRefreshError { message: String },

    #[error("Page token failed live validation: {message}")]
    PublishAuthError { message: String },

    #[error("Publish failed: {message}")]
    PublishError { message: String },

    #[error("A workflow run is already in progress")]
    AlreadyRunning,

    #[error("Background task failed: {message}")]
    TaskError { message: String },

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

impl OrchestratorError {
    pub fn config(message: impl Into<String>) -> Self {
        OrchestratorError::ConfigurationError { message: message.into() }
    }

    pub fn graph(operation: impl Into<String>, reason: ApiFailure) -> Self {
        OrchestratorError::GraphApiError {
            operation: operation.into(),
            reason,
        }
    }

    /// Position of this error in the wire taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::ConfigurationError { .. } => ErrorKind::Configuration,
            OrchestratorError::EmptyList { .. } => ErrorKind::EmptyList,
            OrchestratorError::StateStoreError { .. }
            | OrchestratorError::LockError { .. }
            | OrchestratorError::TaskError { .. }
            | OrchestratorError::SharedError(_)
            | OrchestratorError::IoError(_)
            | OrchestratorError::JsonError(_) => ErrorKind::StateStore,
            OrchestratorError::EmptyStageOutput { .. }
            | OrchestratorError::StageFailed { .. }
            | OrchestratorError::GraphApiError { .. } => ErrorKind::ExternalService,
            OrchestratorError::Generator(GeneratorError::ConfigError { .. }) => ErrorKind::Configuration,
            OrchestratorError::Generator(_) => ErrorKind::ExternalService,
            OrchestratorError::TokenBootstrapRequired { .. } => ErrorKind::TokenBootstrapRequired,
            OrchestratorError::TokenRefreshError { .. } => ErrorKind::TokenRefresh,
            OrchestratorError::PublishAuthError { .. } => ErrorKind::PublishAuth,
            OrchestratorError::PublishError { .. } => ErrorKind::Publish,
            OrchestratorError::AlreadyRunning => ErrorKind::AlreadyRunning,
        }
    }
}

impl From<tokio::task::JoinError> for OrchestratorError {
    fn from(err: tokio::task::JoinError) -> Self {
        OrchestratorError::TaskError { message: err.to_string() }
    }
}
