//! Shared types for the word-of-the-day autopilot
//!
//! Contains only the types that cross crate boundaries: process identity,
//! logging helpers, provider failure classification and the wire shapes of
//! workflow reports. Component-internal types stay in their own crates.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;

pub use types::*;
pub use errors::*;

pub use messages::{
    // Workflow run reporting
    RunOutcome, RunReport, RunSummary, StepEntry, StepEvent, TriggerResponse, WorkflowStage,

    // Rotation status surface
    RotationStatus,
};
