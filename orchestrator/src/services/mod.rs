//! Service implementations
//!
//! File- and HTTP-backed implementations of the orchestrator's trait seams.

pub mod graph_api;
pub mod item_source;
pub mod locks;
pub mod rotation_store;
pub mod run_journal;
pub mod state_store;
pub mod token_manager;

pub use graph_api::{GraphApiClient, GraphCredentials};
pub use item_source::FileItemSource;
pub use locks::{lock_for, AdvisoryFileLock, LockMode, ProcessLock};
pub use rotation_store::RotationStore;
pub use run_journal::RunJournal;
pub use state_store::StateStore;
pub use token_manager::TokenManager;
