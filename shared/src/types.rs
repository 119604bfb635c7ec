//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::SharedError;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Identity reported before any binary has initialised the singleton (tests, library use)
static UNINITIALISED: ProcessId = ProcessId::Orchestrator;

/// Process identifier for any binary in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// One-shot CLI runs and operator commands
    Orchestrator,
    /// Long-running HTTP trigger surface
    WebServer,
}

impl ProcessId {
    /// Initialize the global process ID for the orchestrator CLI
    pub fn init_orchestrator() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Orchestrator)
    }

    /// Initialize the global process ID for webserver
    pub fn init_webserver() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::WebServer)
    }

    /// Get the global process ID, defaulting to the orchestrator when uninitialised
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&UNINITIALISED)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Orchestrator => write!(f, "orchestrator"),
            ProcessId::WebServer => write!(f, "webserver"),
        }
    }
}

/// Failure reasons for calls to external HTTP services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFailure {
    /// Authentication failed (invalid API key or token)
    AuthenticationFailed,
    /// Rate limit exceeded
    RateLimitExceeded,
    /// Invalid request format or parameters
    InvalidRequest(String),
    /// Network/connection error
    NetworkError(String),
    /// Server error from provider
    ServerError(String),
    /// Request timeout
    Timeout,
    /// Service temporarily unavailable
    ServiceUnavailable,
    /// Provider answered but the payload was unusable
    InvalidResponse(String),
}

impl ApiFailure {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => ApiFailure::AuthenticationFailed,
            429 => ApiFailure::RateLimitExceeded,
            503 => ApiFailure::ServiceUnavailable,
            400..=499 => ApiFailure::InvalidRequest(format!("HTTP {status}: {body}")),
            _ => ApiFailure::ServerError(format!("HTTP {status}: {body}")),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::AuthenticationFailed => write!(f, "authentication failed"),
            ApiFailure::RateLimitExceeded => write!(f, "rate limit exceeded"),
            ApiFailure::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            ApiFailure::NetworkError(msg) => write!(f, "network error: {msg}"),
            ApiFailure::ServerError(msg) => write!(f, "server error: {msg}"),
            ApiFailure::Timeout => write!(f, "request timed out"),
            ApiFailure::ServiceUnavailable => write!(f, "service unavailable"),
            ApiFailure::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

/// Error taxonomy surfaced to trigger callers and the run journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "ConfigurationError")]
    Configuration,
    #[serde(rename = "EmptyListError")]
    EmptyList,
    #[serde(rename = "StateCorruptionWarning")]
    StateCorruption,
    #[serde(rename = "StateStoreError")]
    StateStore,
    #[serde(rename = "ExternalServiceError")]
    ExternalService,
    #[serde(rename = "TokenBootstrapRequiredError")]
    TokenBootstrapRequired,
    #[serde(rename = "TokenRefreshError")]
    TokenRefresh,
    #[serde(rename = "PublishAuthError")]
    PublishAuth,
    #[serde(rename = "PublishError")]
    Publish,
    #[serde(rename = "AlreadyRunningError")]
    AlreadyRunning,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::EmptyList => "EmptyListError",
            ErrorKind::StateCorruption => "StateCorruptionWarning",
            ErrorKind::StateStore => "StateStoreError",
            ErrorKind::ExternalService => "ExternalServiceError",
            ErrorKind::TokenBootstrapRequired => "TokenBootstrapRequiredError",
            ErrorKind::TokenRefresh => "TokenRefreshError",
            ErrorKind::PublishAuth => "PublishAuthError",
            ErrorKind::Publish => "PublishError",
            ErrorKind::AlreadyRunning => "AlreadyRunningError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "ConfigurationError" => ErrorKind::Configuration,
            "EmptyListError" => ErrorKind::EmptyList,
            "StateCorruptionWarning" => ErrorKind::StateCorruption,
            "StateStoreError" => ErrorKind::StateStore,
            "ExternalServiceError" => ErrorKind::ExternalService,
            "TokenBootstrapRequiredError" => ErrorKind::TokenBootstrapRequired,
            "TokenRefreshError" => ErrorKind::TokenRefresh,
            "PublishAuthError" => ErrorKind::PublishAuth,
            "PublishError" => ErrorKind::Publish,
            "AlreadyRunningError" => ErrorKind::AlreadyRunning,
            other => {
                return Err(SharedError::UnknownErrorKind {
                    input: other.to_string(),
                })
            }
        };
        Ok(kind)
    }
}
