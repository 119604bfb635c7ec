//! Orchestrator library for the word-of-the-day autopilot
//!
//! Owns the durable state (rotation pointer and OAuth tokens), the Graph API
//! client and the six-stage workflow that turns the next word into a
//! published post. Both the CLI binary and the webserver drive it through
//! [`app::Services`].

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod workflow;

// Re-export commonly used types
pub use app::Services;
pub use config::AppConfig;
pub use error::{OrchestratorError, OrchestratorResult};
pub use services::{RotationStore, StateStore, TokenManager};
pub use traits::{CredentialProvider, ItemRotation, ItemSource, OAuthProvider, Publisher, StoreLock};
pub use workflow::{Workflow, WorkflowAdapters};

// Re-export trait mocks for downstream test suites
pub use traits::{MockCredentialProvider, MockItemRotation, MockItemSource, MockOAuthProvider, MockPublisher};
