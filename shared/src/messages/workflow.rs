//! Workflow run messages
//!
//! A run is ephemeral: the orchestrator builds a [`RunReport`] while the
//! pipeline executes, hands it to the caller, and only the [`RunSummary`]
//! outlives the request (in the run journal).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::ErrorKind;

/// The six pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStage {
    SelectItem,
    GenerateText,
    GenerateImagePrompt,
    GenerateImage,
    ComposeImage,
    Publish,
}

impl WorkflowStage {
    pub const ALL: [WorkflowStage; 6] = [
        WorkflowStage::SelectItem,
        WorkflowStage::GenerateText,
        WorkflowStage::GenerateImagePrompt,
        WorkflowStage::GenerateImage,
        WorkflowStage::ComposeImage,
        WorkflowStage::Publish,
    ];

    /// 1-based position in the pipeline
    pub fn number(&self) -> u8 {
        match self {
            WorkflowStage::SelectItem => 1,
            WorkflowStage::GenerateText => 2,
            WorkflowStage::GenerateImagePrompt => 3,
            WorkflowStage::GenerateImage => 4,
            WorkflowStage::ComposeImage => 5,
            WorkflowStage::Publish => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStage::SelectItem => "Selecting next word",
            WorkflowStage::GenerateText => "Generating post text",
            WorkflowStage::GenerateImagePrompt => "Generating image prompt",
            WorkflowStage::GenerateImage => "Generating image",
            WorkflowStage::ComposeImage => "Composing post image",
            WorkflowStage::Publish => "Publishing post",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({:?})", self.number(), self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEvent {
    Started,
    Completed,
    Failed,
}

/// One line of a run's step log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEntry {
    pub stage: WorkflowStage,
    pub event: StepEvent,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    Success {
        item: String,
        published_id: String,
        image_file: String,
        elapsed_seconds: f64,
    },
    Failure {
        /// Present when the failure happened after an item was selected
        item: Option<String>,
        failed_step: WorkflowStage,
        error_kind: ErrorKind,
        error: String,
        elapsed_seconds: f64,
    },
}

/// Full record of one pipeline execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepEntry>,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Success { .. })
    }

    pub fn elapsed_seconds(&self) -> f64 {
        match &self.outcome {
            RunOutcome::Success { elapsed_seconds, .. } | RunOutcome::Failure { elapsed_seconds, .. } => {
                *elapsed_seconds
            }
        }
    }

    /// Condensed row for the append-only run journal
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: self.finished_at,
            success: self.is_success(),
            item: None,
            published_id: None,
            failed_step: None,
            error_kind: None,
            error: None,
            elapsed_seconds: self.elapsed_seconds(),
        };
        match &self.outcome {
            RunOutcome::Success { item, published_id, .. } => {
                summary.item = Some(item.clone());
                summary.published_id = Some(published_id.clone());
            }
            RunOutcome::Failure { item, failed_step, error_kind, error, .. } => {
                summary.item = item.clone();
                summary.failed_step = Some(*failed_step);
                summary.error_kind = Some(*error_kind);
                summary.error = Some(error.clone());
            }
        }
        summary
    }
}

/// Journal row written once per finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<WorkflowStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_seconds: f64,
}

/// Body returned by the trigger surface and printed by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<WorkflowStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<f64>,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl TriggerResponse {
    /// Bare failure body with no classification, e.g. a bad webhook secret
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            item: None,
            published_id: None,
            image_file: None,
            error: Some(error.into()),
            error_kind: None,
            failed_step: None,
            elapsed_seconds: None,
            steps: Vec::new(),
        }
    }

    /// Response for a trigger that never started a run
    pub fn rejected(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            error_kind: Some(kind),
            ..Self::error(error)
        }
    }
}

impl From<&RunReport> for TriggerResponse {
    fn from(report: &RunReport) -> Self {
        let steps = report.steps.iter().map(|step| step.message.clone()).collect();
        match &report.outcome {
            RunOutcome::Success { item, published_id, image_file, elapsed_seconds } => Self {
                success: true,
                item: Some(item.clone()),
                published_id: Some(published_id.clone()),
                image_file: Some(image_file.clone()),
                error: None,
                error_kind: None,
                failed_step: None,
                elapsed_seconds: Some(*elapsed_seconds),
                steps,
            },
            RunOutcome::Failure { failed_step, error_kind, error, elapsed_seconds, .. } => Self {
                success: false,
                item: None,
                published_id: None,
                image_file: None,
                error: Some(error.clone()),
                error_kind: Some(*error_kind),
                failed_step: Some(*failed_step),
                elapsed_seconds: Some(*elapsed_seconds),
                steps,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_report() -> RunReport {
        let now = Utc::now();
        RunReport {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            steps: vec![StepEntry {
                stage: WorkflowStage::GenerateImagePrompt,
                event: StepEvent::Failed,
                message: "Step 3 failed: empty prompt".to_string(),
                at: now,
            }],
            outcome: RunOutcome::Failure {
                item: Some("alpha".to_string()),
                failed_step: WorkflowStage::GenerateImagePrompt,
                error_kind: ErrorKind::ExternalService,
                error: "empty prompt".to_string(),
                elapsed_seconds: 1.25,
            },
        }
    }

    #[test]
    fn test_stage_numbers_follow_pipeline_order() {
        let numbers: Vec<u8> = WorkflowStage::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_failure_response_carries_kind_and_step() {
        let response = TriggerResponse::from(&failed_report());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["errorKind"], "ExternalServiceError");
        assert_eq!(json["failedStep"], "GenerateImagePrompt");
        assert_eq!(json["elapsedSeconds"], 1.25);
        assert_eq!(json["steps"][0], "Step 3 failed: empty prompt");
        assert!(json.get("publishedId").is_none());
    }

    #[test]
    fn test_summary_keeps_item_of_failed_run() {
        let summary = failed_report().summary();
        assert!(!summary.success);
        assert_eq!(summary.item.as_deref(), Some("alpha"));
        assert_eq!(summary.failed_step, Some(WorkflowStage::GenerateImagePrompt));
    }
}
