//! Wire types exchanged between the orchestrator, the webserver and the CLI
//!
//! - `workflow`: step log, run outcome and trigger response shapes
//! - `rotation`: rotation store status surface

pub mod rotation;
pub mod workflow;

pub use rotation::RotationStatus;

pub use workflow::{
    RunOutcome, RunReport, RunSummary, StepEntry, StepEvent, TriggerResponse, WorkflowStage,
};
