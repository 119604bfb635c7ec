//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator the workflow and the stores talk to sits behind one of
//! these seams: production wiring plugs in the file- and HTTP-backed services,
//! tests plug in the generated mocks.

use async_trait::async_trait;
use std::path::Path;

use shared::RotationStatus;
use crate::core::{LongLivedGrant, ServiceGrant};
use crate::error::OrchestratorResult;

/// Held mutual exclusion; released on drop
pub struct LockGuard {
    _inner: Box<dyn Send>,
}

impl LockGuard {
    pub fn new<G: Send + 'static>(guard: G) -> Self {
        Self { _inner: Box::new(guard) }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LockGuard")
    }
}

/// Mutual exclusion scoped to one storage key
///
/// `acquire` blocks the calling thread; async callers go through
/// `spawn_blocking`.
pub trait StoreLock: Send + Sync {
    fn acquire(&self) -> OrchestratorResult<LockGuard>;

    /// Non-blocking acquire; `None` while another holder has the lock
    fn try_acquire(&self) -> OrchestratorResult<Option<LockGuard>>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Source of the ordered item list
#[mockall::automock]
pub trait ItemSource: Send + Sync {
    /// Load the full list, in order; called on every selection
    fn load_items(&self) -> OrchestratorResult<Vec<String>>;

    fn describe(&self) -> String;
}

/// Rotation pointer over the item list
#[mockall::automock]
#[async_trait]
pub trait ItemRotation: Send + Sync {
    /// Return the next item and advance the pointer exactly once
    async fn next_item(&self) -> OrchestratorResult<String>;

    /// Read-only view of the pointer
    async fn status(&self) -> OrchestratorResult<RotationStatus>;
}

/// OAuth-capable social platform API
#[mockall::automock]
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Exchange a user token for a long-lived one
    async fn exchange_long_lived(&self, token: &str) -> OrchestratorResult<LongLivedGrant>;

    /// Derive the page (service) token from a long-lived user token
    async fn derive_service_token(&self, user_token: &str) -> OrchestratorResult<ServiceGrant>;

    /// Ask the platform whether a token is currently valid
    async fn introspect_token(&self, token: &str) -> OrchestratorResult<bool>;
}

/// Publishes the finished post
#[mockall::automock]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns the platform's id for the new post
    async fn publish(&self, text: &str, image_path: &Path, credential: &str) -> OrchestratorResult<String>;
}

/// Hands out a publishing credential that is valid right now
#[mockall::automock]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn ensure_valid_token(&self) -> OrchestratorResult<String>;

    /// Side-effect-free live check; `false` on any inspection failure
    async fn validate_live(&self, token: &str) -> bool;
}
