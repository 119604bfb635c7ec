//! Builder for workflows wired entirely with mocks

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Notify;

use generator::{
    GeneratorResult, MockImageCompositor, MockImageGenerator, MockImagePromptGenerator, MockTextGenerator,
    RawImage, TextGenerator,
};
use orchestrator::services::{lock_for, LockMode, RunJournal};
use orchestrator::workflow::RUN_LOCK_KEY;
use orchestrator::{
    MockCredentialProvider, MockItemRotation, MockPublisher, StateStore, StoreLock, Workflow, WorkflowAdapters,
};
use tempfile::TempDir;

/// Builder pattern for workflows whose stages all succeed unless overridden
pub struct WorkflowBuilder {
    pub dir: TempDir,
    pub rotation: MockItemRotation,
    pub text: MockTextGenerator,
    pub image_prompt: MockImagePromptGenerator,
    pub images: MockImageGenerator,
    pub compositor: MockImageCompositor,
    pub credentials: MockCredentialProvider,
    pub publisher: MockPublisher,
    text_override: Option<Arc<dyn TextGenerator>>,
    journal: bool,
    run_lock: Option<Arc<dyn StoreLock>>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            rotation: MockItemRotation::new(),
            text: MockTextGenerator::new(),
            image_prompt: MockImagePromptGenerator::new(),
            images: MockImageGenerator::new(),
            compositor: MockImageCompositor::new(),
            credentials: MockCredentialProvider::new(),
            publisher: MockPublisher::new(),
            text_override: None,
            journal: false,
            run_lock: None,
        }
    }

    /// Every stage succeeds once, for the word "alpha"
    pub fn happy_path() -> Self {
        let mut builder = Self::happy_path_until_publish();
        builder
            .publisher
            .expect_publish()
            .withf(|text, _, credential| text.starts_with("A post about") && credential == "page-token")
            .times(1)
            .returning(|_, _, _| Ok("456_789".to_string()));
        builder
    }

    /// Stages 1 to 5 succeed and the token is valid; the publisher is left unconfigured
    pub fn happy_path_until_publish() -> Self {
        let mut builder = Self::new();
        builder.rotation.expect_next_item().times(1).returning(|| Ok("alpha".to_string()));
        builder
            .text
            .expect_generate_text()
            .times(0..=1)
            .returning(|item| Ok(format!("A post about {item}")));
        builder
            .image_prompt
            .expect_generate_image_prompt()
            .times(1)
            .returning(|_, item| Ok(format!("an illustration of {item}")));
        builder
            .images
            .expect_generate_image()
            .times(1)
            .returning(|_| Ok(RawImage::new(vec![0xFF, 0xD8, 0xFF, 0xE0], Some("image/jpeg".to_string()))));
        builder.expect_compose_into_dir();
        builder
            .credentials
            .expect_ensure_valid_token()
            .times(1)
            .returning(|| Ok("page-token".to_string()));
        builder.credentials.expect_validate_live().times(1).returning(|_| true);
        builder
    }

    /// Compositor writes the bytes into the builder's temp dir
    pub fn expect_compose_into_dir(&mut self) {
        let out = self.dir.path().to_path_buf();
        self.compositor.expect_compose().times(1).returning(move |image, item| {
            let path = out.join(format!("post_{item}.jpg"));
            std::fs::write(&path, &image.bytes).unwrap();
            Ok(path)
        });
    }

    pub fn with_text_generator(mut self, text: Arc<dyn TextGenerator>) -> Self {
        self.text_override = Some(text);
        self
    }

    pub fn with_journal(mut self) -> Self {
        self.journal = true;
        self
    }

    /// Share the deployment-wide run lock of `data_dir`
    pub fn with_run_lock_in(mut self, data_dir: &Path, mode: LockMode) -> Self {
        self.run_lock = Some(lock_for(mode, &StateStore::new(data_dir).path_for(RUN_LOCK_KEY)));
        self
    }

    pub fn journal_path(&self) -> PathBuf {
        self.dir.path().join("logs").join("runs.jsonl")
    }

    pub fn build(self) -> (Workflow, TempDir) {
        let adapters = WorkflowAdapters {
            rotation: Arc::new(self.rotation),
            text: match self.text_override {
                Some(text) => text,
                None => Arc::new(self.text) as Arc<dyn TextGenerator>,
            },
            image_prompt: Arc::new(self.image_prompt),
            images: Arc::new(self.images),
            compositor: Arc::new(self.compositor),
            credentials: Arc::new(self.credentials),
            publisher: Arc::new(self.publisher),
        };
        let mut workflow = Workflow::new(adapters);
        if self.journal {
            workflow = workflow.with_journal(RunJournal::in_dir(&self.dir.path().join("logs")));
        }
        if let Some(lock) = self.run_lock {
            workflow = workflow.with_run_lock(lock);
        }
        (workflow, self.dir)
    }
}

/// Text generator that parks until the test releases it
pub struct GatedTextGenerator {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedTextGenerator {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for GatedTextGenerator {
    async fn generate_text(&self, item: &str) -> GeneratorResult<String> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(format!("A post about {item}"))
    }
}
