//! Image prompt generation, always served by GPT

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::core::PromptTemplates;
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::{ChatBackend, ImagePromptGenerator};

const LABEL: &str = "generate_image_prompt";

pub struct ChatImagePromptGenerator {
    backend: Arc<dyn ChatBackend>,
    templates: Arc<PromptTemplates>,
}

impl ChatImagePromptGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, templates: Arc<PromptTemplates>) -> Self {
        Self { backend, templates }
    }
}

#[async_trait]
impl ImagePromptGenerator for ChatImagePromptGenerator {
    async fn generate_image_prompt(&self, text: &str, item: &str) -> GeneratorResult<String> {
        if text.trim().is_empty() {
            return Err(GeneratorError::invalid("post text must be a non-empty string"));
        }
        if item.trim().is_empty() {
            return Err(GeneratorError::invalid("word must be a non-empty string"));
        }

        let user_prompt = self.templates.render_image_user(item, text);
        let response = self
            .backend
            .complete(&self.templates.image_system, &user_prompt, LABEL)
            .await
            .map_err(|reason| GeneratorError::ProviderError {
                provider: self.backend.provider_name().to_string(),
                label: LABEL.to_string(),
                reason,
            })?;

        let prompt = response.content.trim().to_string();
        if prompt.is_empty() {
            return Err(GeneratorError::empty(format!("{} ({LABEL})", self.backend.provider_name())));
        }

        info!("Image prompt ready: {} chars", prompt.chars().count());
        Ok(prompt)
    }
}
