//! HTTP surface for the word-of-the-day autopilot
//!
//! Exposes the workflow trigger for external schedulers, a read-only view of
//! the rotation pointer, and a liveness check.

pub mod error;
pub mod state;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use webserver_impl::WebServer;
