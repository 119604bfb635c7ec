//! Common test utilities and infrastructure
//!
//! Shared fixtures and builders used across the orchestrator test suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{GatedTextGenerator, WorkflowBuilder};
