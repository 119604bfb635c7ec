//! OpenAI chat completions backend

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use shared::ApiFailure;
use super::http::{build_client, read_json, transport_failure, usage_field, DEFAULT_TIMEOUT};
use crate::error::GeneratorResult;
use crate::traits::ChatBackend;
use crate::types::ProviderResponse;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const OPENAI_MODEL: &str = "gpt-4o-mini";

/// Chat backend for `gpt-4o-mini`
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>) -> GeneratorResult<Self> {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> GeneratorResult<Self> {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> GeneratorResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: OPENAI_MODEL.to_string(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    fn provider_name(&self) -> &'static str {
        "GPT"
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str, label: &str) -> Result<ProviderResponse, ApiFailure> {
        info!("GPT call: {}", label);
        let request_start = Instant::now();

        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt.trim() },
                { "role": "user", "content": user_prompt.trim() }
            ],
            "response_format": { "type": "text" }
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(transport_failure)?;

        let response_json = read_json(response).await?;
        let response_time = request_start.elapsed();

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| ApiFailure::InvalidResponse("No content in response".to_string()))?;

        let usage = response_json.get("usage");
        debug!("GPT response [{}]: {} chars in {:?}", label, content.len(), response_time);

        Ok(ProviderResponse {
            content: content.to_string(),
            tokens_used: usage_field(usage, "total_tokens"),
            prompt_tokens: usage_field(usage, "prompt_tokens"),
            completion_tokens: usage_field(usage, "completion_tokens"),
            model_used: self.model.clone(),
            response_time,
        })
    }
}
