//! Shared handler state

use std::sync::Arc;

use orchestrator::{ItemRotation, Workflow};

/// Everything the handlers need, shared behind one `Arc`
pub struct WebServerState {
    pub workflow: Arc<Workflow>,
    pub rotation: Arc<dyn ItemRotation>,
    webhook_secret: Option<String>,
}

impl WebServerState {
    pub fn new(workflow: Arc<Workflow>, rotation: Arc<dyn ItemRotation>) -> Self {
        Self {
            workflow,
            rotation,
            webhook_secret: None,
        }
    }

    /// Require `X-Webhook-Secret` on triggers; blank disables the check
    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret.filter(|s| !s.is_empty());
        self
    }

    /// Whether a trigger presenting `provided` may start a run
    pub fn authorizes(&self, provided: Option<&str>) -> bool {
        match &self.webhook_secret {
            None => true,
            Some(expected) => provided == Some(expected.as_str()),
        }
    }
}
