//! Adapter trait definitions for dependency injection

use std::path::PathBuf;
use async_trait::async_trait;

use shared::ApiFailure;
use crate::error::GeneratorResult;
use crate::types::{ProviderResponse, RawImage};

/// Single-turn chat completion against one LLM provider
#[mockall::automock]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Provider name used in logs and errors
    fn provider_name(&self) -> &'static str;

    /// Send a system + user prompt pair and return the completion
    async fn complete(&self, system_prompt: &str, user_prompt: &str, label: &str) -> Result<ProviderResponse, ApiFailure>;
}

/// Produces the post body for a word
#[mockall::automock]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, item: &str) -> GeneratorResult<String>;
}

/// Produces an image-generation prompt from the post body
#[mockall::automock]
#[async_trait]
pub trait ImagePromptGenerator: Send + Sync {
    async fn generate_image_prompt(&self, text: &str, item: &str) -> GeneratorResult<String>;
}

/// Renders an image from a prompt
#[mockall::automock]
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> GeneratorResult<RawImage>;
}

/// Turns the generated image into the final post image on disk
#[mockall::automock]
#[async_trait]
pub trait ImageCompositor: Send + Sync {
    async fn compose(&self, image: &RawImage, item: &str) -> GeneratorResult<PathBuf>;
}
