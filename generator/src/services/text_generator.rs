//! Post text generation over a chat backend

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{AnthropicChat, OpenAiChat};
use crate::core::{polish_post_text, PromptTemplates};
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::{ChatBackend, TextGenerator};
use crate::types::TextProvider;

pub struct ChatTextGenerator {
    backend: Arc<dyn ChatBackend>,
    templates: Arc<PromptTemplates>,
}

impl ChatTextGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, templates: Arc<PromptTemplates>) -> Self {
        Self { backend, templates }
    }
}

#[async_trait]
impl TextGenerator for ChatTextGenerator {
    async fn generate_text(&self, item: &str) -> GeneratorResult<String> {
        if item.trim().is_empty() {
            return Err(GeneratorError::invalid("word must be a non-empty string"));
        }

        let label = format!("generate_post_text({})", item.trim());
        let user_prompt = self.templates.render_text_user(item);
        let response = self
            .backend
            .complete(&self.templates.text_system, &user_prompt, &label)
            .await
            .map_err(|reason| GeneratorError::ProviderError {
                provider: self.backend.provider_name().to_string(),
                label: label.clone(),
                reason,
            })?;

        let text = polish_post_text(&response.content);
        if text.is_empty() {
            return Err(GeneratorError::empty(format!("{} ({label})", self.backend.provider_name())));
        }

        info!(
            "Post text ready: {} chars, {} tokens via {}",
            text.chars().count(),
            response.tokens_used,
            response.model_used
        );
        Ok(text)
    }
}

/// Select the post-text backend once at startup
pub fn build_text_generator(
    provider: TextProvider,
    openai_api_key: &str,
    anthropic_api_key: Option<&str>,
    templates: Arc<PromptTemplates>,
) -> GeneratorResult<Arc<dyn TextGenerator>> {
    let backend: Arc<dyn ChatBackend> = match provider {
        TextProvider::Gpt => Arc::new(OpenAiChat::new(openai_api_key)?),
        TextProvider::Claude => {
            let key = anthropic_api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| GeneratorError::ConfigError {
                    message: "ANTHROPIC_API_KEY is required when TEXT_GENERATION_PROVIDER=claude".to_string(),
                })?;
            Arc::new(AnthropicChat::new(key)?)
        }
    };
    info!("Text generation provider: {}", provider);
    Ok(Arc::new(ChatTextGenerator::new(backend, templates)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockChatBackend;
    use crate::types::ProviderResponse;
    use shared::ApiFailure;
    use std::time::Duration;

    fn reply(content: &str) -> ProviderResponse {
        ProviderResponse {
            content: content.to_string(),
            tokens_used: 10,
            prompt_tokens: 6,
            completion_tokens: 4,
            model_used: "mock".to_string(),
            response_time: Duration::from_millis(5),
        }
    }

    fn generator(backend: MockChatBackend) -> ChatTextGenerator {
        ChatTextGenerator::new(Arc::new(backend), Arc::new(PromptTemplates::default()))
    }

    #[tokio::test]
    async fn test_generated_text_is_polished() {
        let mut backend = MockChatBackend::new();
        backend.expect_provider_name().return_const("GPT");
        backend
            .expect_complete()
            .withf(|_, user, label| user.contains("alpha") && label == "generate_post_text(alpha)")
            .times(1)
            .returning(|_, _, _| Ok(reply("# Title\n**alpha** means first")));

        let text = generator(backend).generate_text("alpha").await.unwrap();
        assert_eq!(text, "𝐚𝐥𝐩𝐡𝐚 means first");
    }

    #[tokio::test]
    async fn test_blank_word_is_rejected_without_calling_backend() {
        let mut backend = MockChatBackend::new();
        backend.expect_complete().never();

        let err = generator(backend).generate_text("   ").await.unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_heading_only_reply_counts_as_empty() {
        let mut backend = MockChatBackend::new();
        backend.expect_provider_name().return_const("Claude");
        backend.expect_complete().returning(|_, _, _| Ok(reply("# only a heading")));

        let err = generator(backend).generate_text("beta").await.unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyOutput { .. }));
    }

    #[tokio::test]
    async fn test_backend_failure_names_provider() {
        let mut backend = MockChatBackend::new();
        backend.expect_provider_name().return_const("GPT");
        backend
            .expect_complete()
            .returning(|_, _, _| Err(ApiFailure::RateLimitExceeded));

        let err = generator(backend).generate_text("gamma").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "GPT request failed during 'generate_post_text(gamma)': rate limit exceeded"
        );
    }

    #[test]
    fn test_claude_requires_key() {
        let result = build_text_generator(TextProvider::Claude, "sk-test", None, Arc::new(PromptTemplates::default()));
        assert!(matches!(result, Err(GeneratorError::ConfigError { .. })));
    }
}
