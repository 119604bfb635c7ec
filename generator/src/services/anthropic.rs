//! Anthropic messages backend

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use shared::ApiFailure;
use super::http::{build_client, read_json, transport_failure, usage_field, DEFAULT_TIMEOUT};
use crate::error::GeneratorResult;
use crate::traits::ChatBackend;
use crate::types::ProviderResponse;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

pub struct AnthropicChat {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicChat {
    pub fn new(api_key: impl Into<String>) -> GeneratorResult<Self> {
        Self::with_base_url(api_key, ANTHROPIC_BASE_URL)
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
            model: ANTHROPIC_MODEL.to_string(),
        })
    }
}

#[async_trait]
impl ChatBackend for AnthropicChat {
    fn provider_name(&self) -> &'static str {
        "Claude"
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str, label: &str) -> Result<ProviderResponse, ApiFailure> {
        info!("Claude call: {}", label);
        let request_start = Instant::now();

        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt.trim(),
            "messages": [
                { "role": "user", "content": user_prompt.trim() }
            ]
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(transport_failure)?;

        let response_json = read_json(response).await?;
        let response_time = request_start.elapsed();

        let content = response_json
            .get("content")
            .and_then(|content| content.get(0))
            .and_then(|block| block.get("text"))
            .and_then(|text| text.as_str())
            .ok_or_else(|| ApiFailure::InvalidResponse("No content in response".to_string()))?;

        let usage = response_json.get("usage");
        let prompt_tokens = usage_field(usage, "input_tokens");
        let completion_tokens = usage_field(usage, "output_tokens");
        debug!("Claude response [{}]: {} chars in {:?}", label, content.len(), response_time);

        Ok(ProviderResponse {
            content: content.to_string(),
            tokens_used: prompt_tokens + completion_tokens,
            prompt_tokens,
            completion_tokens,
            model_used: self.model.clone(),
            response_time,
        })
    }
}
