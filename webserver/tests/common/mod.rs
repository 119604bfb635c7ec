//! Test helpers: mock-wired workflows and request shortcuts
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::ServiceExt;

use generator::{MockImageCompositor, MockImageGenerator, MockImagePromptGenerator, MockTextGenerator, RawImage};
use orchestrator::{
    ItemRotation, MockCredentialProvider, MockItemRotation, MockPublisher, OrchestratorError, OrchestratorResult,
    Workflow, WorkflowAdapters,
};
use shared::RotationStatus;
use webserver::{WebServer, WebServerState};

/// Adapters whose every stage succeeds, publishing `word`
pub fn happy_adapters(dir: &TempDir, word: &'static str) -> WorkflowAdapters {
    let mut rotation = MockItemRotation::new();
    rotation.expect_next_item().returning(move || Ok(word.to_string()));

    let mut text = MockTextGenerator::new();
    text.expect_generate_text().returning(|item| Ok(format!("Today's word: {item}")));
    let mut image_prompt = MockImagePromptGenerator::new();
    image_prompt.expect_generate_image_prompt().returning(|_, item| Ok(format!("a painting of {item}")));
    let mut images = MockImageGenerator::new();
    images.expect_generate_image().returning(|_| Ok(RawImage::new(vec![1, 2, 3], None)));

    let out: PathBuf = dir.path().join(format!("post_{word}.jpg"));
    let mut compositor = MockImageCompositor::new();
    compositor.expect_compose().returning(move |_, _| {
        std::fs::write(&out, b"jpeg").unwrap();
        Ok(out.clone())
    });

    let mut credentials = MockCredentialProvider::new();
    credentials.expect_ensure_valid_token().returning(|| Ok("page-token".to_string()));
    credentials.expect_validate_live().returning(|_| true);
    let mut publisher = MockPublisher::new();
    publisher.expect_publish().returning(|_, _, _| Ok("456_789".to_string()));

    WorkflowAdapters {
        rotation: Arc::new(rotation),
        text: Arc::new(text),
        image_prompt: Arc::new(image_prompt),
        images: Arc::new(images),
        compositor: Arc::new(compositor),
        credentials: Arc::new(credentials),
        publisher: Arc::new(publisher),
    }
}

/// Adapters that fail at word selection; later stages must never run
pub fn empty_list_adapters() -> WorkflowAdapters {
    let mut rotation = MockItemRotation::new();
    rotation.expect_next_item().returning(|| {
        Err(OrchestratorError::EmptyList {
            source_name: "words.txt".to_string(),
        })
    });
    with_rotation(Arc::new(rotation))
}

/// Adapters with the given rotation and untouched mocks everywhere else
pub fn with_rotation(rotation: Arc<dyn ItemRotation>) -> WorkflowAdapters {
    WorkflowAdapters {
        rotation,
        text: Arc::new(MockTextGenerator::new()),
        image_prompt: Arc::new(MockImagePromptGenerator::new()),
        images: Arc::new(MockImageGenerator::new()),
        compositor: Arc::new(MockImageCompositor::new()),
        credentials: Arc::new(MockCredentialProvider::new()),
        publisher: Arc::new(MockPublisher::new()),
    }
}

/// Rotation that parks in `next_item` until released, then reports an empty list
pub struct GatedRotation {
    pub entered: Notify,
    pub release: Notify,
}

impl GatedRotation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl ItemRotation for GatedRotation {
    async fn next_item(&self) -> OrchestratorResult<String> {
        self.entered.notify_one();
        self.release.notified().await;
        Err(OrchestratorError::EmptyList {
            source_name: "words.txt".to_string(),
        })
    }

    async fn status(&self) -> OrchestratorResult<RotationStatus> {
        Ok(RotationStatus {
            current_index: 0,
            total_processed: 0,
            last_item: String::new(),
            total_items: None,
        })
    }
}

pub fn router(adapters: WorkflowAdapters, status: Arc<dyn ItemRotation>, secret: Option<&str>) -> Router {
    let state = WebServerState::new(Arc::new(Workflow::new(adapters)), status)
        .with_webhook_secret(secret.map(str::to_string));
    WebServer::new(state).build_router()
}

pub fn trigger_request(secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/webhook/trigger");
    if let Some(secret) = secret {
        builder = builder.header("X-Webhook-Secret", secret);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send one request and decode the JSON body
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
