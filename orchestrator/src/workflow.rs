//! Six-stage publish pipeline
//!
//! Stages run strictly in order and the first failure ends the run. The
//! rotation pointer is not rolled back when a later stage fails: the word is
//! consumed either way. Only one run may be in flight; a second trigger is
//! rejected with [`OrchestratorError::AlreadyRunning`] instead of queueing.
//! The in-process mutex covers one `Workflow`; the optional run lock extends
//! the exclusion to every process sharing the data directory.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use uuid::Uuid;

use generator::{GeneratorError, ImageCompositor, ImageGenerator, ImagePromptGenerator, TextGenerator};
use shared::{
    logging, process_error, process_info, process_warn, ProcessId, RunOutcome, RunReport, StepEntry, StepEvent,
    WorkflowStage,
};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::services::RunJournal;
use crate::traits::{CredentialProvider, ItemRotation, Publisher, StoreLock};

/// Storage key of the run lock; the lock file is `run.lock` in the data directory
pub const RUN_LOCK_KEY: &str = "run";

/// Everything a run talks to, built once at startup
#[derive(Clone)]
pub struct WorkflowAdapters {
    pub rotation: Arc<dyn ItemRotation>,
    pub text: Arc<dyn TextGenerator>,
    pub image_prompt: Arc<dyn ImagePromptGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    pub compositor: Arc<dyn ImageCompositor>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub publisher: Arc<dyn Publisher>,
}

pub struct Workflow {
    adapters: WorkflowAdapters,
    journal: Option<RunJournal>,
    run_lock: Mutex<()>,
    shared_run_lock: Option<Arc<dyn StoreLock>>,
}

/// Step log and progress of the run being executed
struct RunContext {
    steps: Vec<StepEntry>,
    stage: WorkflowStage,
    item: Option<String>,
}

impl RunContext {
    fn new() -> Self {
        Self {
            steps: Vec::new(),
            stage: WorkflowStage::SelectItem,
            item: None,
        }
    }

    fn record(&mut self, event: StepEvent, message: String) {
        self.steps.push(StepEntry {
            stage: self.stage,
            event,
            message,
            at: Utc::now(),
        });
    }

    fn begin(&mut self, stage: WorkflowStage) {
        self.stage = stage;
        let message = format!("Step {}: {}", stage.number(), stage.label());
        process_info!(ProcessId::current(), "{}", message);
        self.record(StepEvent::Started, message);
    }

    fn complete(&mut self, detail: String) {
        let message = format!("Step {} done: {}", self.stage.number(), detail);
        process_info!(ProcessId::current(), "{}", message);
        self.record(StepEvent::Completed, message);
    }

    fn fail(&mut self, error: &OrchestratorError) {
        let message = format!("Step {} failed: {}", self.stage.number(), error);
        process_error!(ProcessId::current(), kind = %error.kind(), "{}", message);
        self.record(StepEvent::Failed, message);
    }
}

struct Published {
    item: String,
    published_id: String,
    image_file: PathBuf,
}

fn stage_failed(stage: WorkflowStage) -> impl FnOnce(GeneratorError) -> OrchestratorError {
    move |source| OrchestratorError::StageFailed { stage, source }
}

fn require_non_empty(stage: WorkflowStage, value: &str, what: &str) -> OrchestratorResult<()> {
    if value.trim().is_empty() {
        return Err(OrchestratorError::EmptyStageOutput {
            stage,
            what: what.to_string(),
        });
    }
    Ok(())
}

fn round_seconds(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

impl Workflow {
    pub fn new(adapters: WorkflowAdapters) -> Self {
        Self {
            adapters,
            journal: None,
            run_lock: Mutex::new(()),
            shared_run_lock: None,
        }
    }

    /// Exclude runs of other `Workflow` instances holding the same lock
    pub fn with_run_lock(mut self, lock: Arc<dyn StoreLock>) -> Self {
        self.shared_run_lock = Some(lock);
        self
    }

    pub fn with_journal(mut self, journal: RunJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Whether this instance has a run in flight
    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Execute one run
    ///
    /// Pipeline failures come back as a report with a failure outcome; the
    /// only error is a rejected concurrent trigger.
    pub async fn run(&self) -> OrchestratorResult<RunReport> {
        let Ok(_running) = self.run_lock.try_lock() else {
            process_warn!(ProcessId::current(), "Trigger rejected: a run is already in progress");
            return Err(OrchestratorError::AlreadyRunning);
        };
        let _shared = match &self.shared_run_lock {
            Some(lock) => match lock.try_acquire()? {
                Some(guard) => Some(guard),
                None => {
                    process_warn!(
                        ProcessId::current(),
                        "Trigger rejected: another process holds {}",
                        lock.describe()
                    );
                    return Err(OrchestratorError::AlreadyRunning);
                }
            },
            None => None,
        };

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();
        logging::log_progress(ProcessId::current(), "Workflow started", &run_id.to_string());

        let mut ctx = RunContext::new();
        let outcome = match self.pipeline(&mut ctx).await {
            Ok(published) => {
                let elapsed_seconds = round_seconds(started);
                logging::log_success(
                    ProcessId::current(),
                    &format!(
                        "Workflow complete for '{}' in {:.2}s. Post ID: {}",
                        published.item, elapsed_seconds, published.published_id
                    ),
                );
                RunOutcome::Success {
                    item: published.item,
                    published_id: published.published_id,
                    image_file: published.image_file.display().to_string(),
                    elapsed_seconds,
                }
            }
            Err(error) => {
                ctx.fail(&error);
                let elapsed_seconds = round_seconds(started);
                logging::log_error(ProcessId::current(), &format!("Workflow ({})", ctx.stage), &error);
                RunOutcome::Failure {
                    item: ctx.item.clone(),
                    failed_step: ctx.stage,
                    error_kind: error.kind(),
                    error: error.to_string(),
                    elapsed_seconds,
                }
            }
        };

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            steps: ctx.steps,
            outcome,
        };

        if let Some(journal) = &self.journal {
            if let Err(e) = journal.append(&report.summary()).await {
                process_warn!(ProcessId::current(), "Could not append run summary to journal: {}", e);
            }
        }
        Ok(report)
    }

    async fn pipeline(&self, ctx: &mut RunContext) -> OrchestratorResult<Published> {
        let a = &self.adapters;

        ctx.begin(WorkflowStage::SelectItem);
        let item = a.rotation.next_item().await?;
        require_non_empty(WorkflowStage::SelectItem, &item, "selected word")?;
        ctx.item = Some(item.clone());
        ctx.complete(format!("word='{item}'"));

        ctx.begin(WorkflowStage::GenerateText);
        let text = a
            .text
            .generate_text(&item)
            .await
            .map_err(stage_failed(WorkflowStage::GenerateText))?;
        require_non_empty(WorkflowStage::GenerateText, &text, "post text")?;
        ctx.complete(format!("text length={}", text.chars().count()));

        ctx.begin(WorkflowStage::GenerateImagePrompt);
        let prompt = a
            .image_prompt
            .generate_image_prompt(&text, &item)
            .await
            .map_err(stage_failed(WorkflowStage::GenerateImagePrompt))?;
        require_non_empty(WorkflowStage::GenerateImagePrompt, &prompt, "image prompt")?;
        ctx.complete(format!("prompt length={}", prompt.chars().count()));

        ctx.begin(WorkflowStage::GenerateImage);
        let image = a
            .images
            .generate_image(&prompt)
            .await
            .map_err(stage_failed(WorkflowStage::GenerateImage))?;
        if image.is_empty() {
            return Err(OrchestratorError::EmptyStageOutput {
                stage: WorkflowStage::GenerateImage,
                what: "image bytes".to_string(),
            });
        }
        ctx.complete(format!("image size={} bytes", image.len()));

        ctx.begin(WorkflowStage::ComposeImage);
        let image_file = a
            .compositor
            .compose(&image, &item)
            .await
            .map_err(stage_failed(WorkflowStage::ComposeImage))?;
        if !image_file.exists() {
            return Err(OrchestratorError::EmptyStageOutput {
                stage: WorkflowStage::ComposeImage,
                what: format!("composed image missing at {}", image_file.display()),
            });
        }
        ctx.complete(format!("saved to {}", image_file.display()));

        ctx.begin(WorkflowStage::Publish);
        let token = a.credentials.ensure_valid_token().await?;
        if !a.credentials.validate_live(&token).await {
            return Err(OrchestratorError::PublishAuthError {
                message: "page token is invalid. Check logs and re-bootstrap".to_string(),
            });
        }
        let published_id = a.publisher.publish(&text, &image_file, &token).await?;
        if published_id.trim().is_empty() {
            return Err(OrchestratorError::PublishError {
                message: "publisher returned an empty post id".to_string(),
            });
        }
        ctx.complete(format!("post ID={published_id}"));

        Ok(Published {
            item,
            published_id,
            image_file,
        })
    }
}
