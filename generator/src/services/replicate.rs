//! Replicate SDXL Lightning image generation

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use shared::ApiFailure;
use super::http::{build_client, read_json, transport_failure, DEFAULT_TIMEOUT};
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::ImageGenerator;
use crate::types::RawImage;

pub const REPLICATE_BASE_URL: &str = "https://api.replicate.com";
pub const SDXL_LIGHTNING_VERSION: &str = "5599ed30703defd1d160a25a63321b4dec97101d98b4674bcc56e41f62f35637";

const PROVIDER: &str = "Replicate";
const LABEL: &str = "generate_image";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_MAX_POLLS: u32 = 90;

/// Image generator backed by the Replicate predictions API
pub struct ReplicateImageGenerator {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl ReplicateImageGenerator {
    pub fn new(api_token: impl Into<String>) -> GeneratorResult<Self> {
        Self::with_base_url(api_token, REPLICATE_BASE_URL)
    }

    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> GeneratorResult<Self> {
        Ok(Self {
            client: build_client(DEFAULT_TIMEOUT)?,
            api_token: api_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        })
    }

    /// Override prediction polling cadence
    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    fn failure(&self, reason: ApiFailure) -> GeneratorError {
        GeneratorError::ProviderError {
            provider: PROVIDER.to_string(),
            label: LABEL.to_string(),
            reason,
        }
    }

    async fn create_prediction(&self, prompt: &str) -> Result<Value, ApiFailure> {
        let request_body = serde_json::json!({
            "version": SDXL_LIGHTNING_VERSION,
            "input": {
                "prompt": prompt,
                "width": 1024,
                "height": 1024,
                "num_outputs": 1,
                "scheduler": "K_EULER",
                "guidance_scale": 0,
                "num_inference_steps": 4
            }
        });

        let response = self
            .client
            .post(format!("{}/v1/predictions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Prefer", "wait")
            .json(&request_body)
            .send()
            .await
            .map_err(transport_failure)?;

        read_json(response).await
    }

    async fn fetch_prediction(&self, url: &str) -> Result<Value, ApiFailure> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await
            .map_err(transport_failure)?;

        read_json(response).await
    }

    /// Poll until the prediction reaches a terminal status
    async fn wait_for_prediction(&self, mut prediction: Value) -> Result<Value, ApiFailure> {
        let mut polls = 0;
        loop {
            let status = prediction.get("status").and_then(Value::as_str).unwrap_or("unknown");
            match status {
                "succeeded" => return Ok(prediction),
                "failed" | "canceled" => {
                    let detail = prediction
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("no error detail")
                        .to_string();
                    return Err(ApiFailure::ServerError(format!("prediction {status}: {detail}")));
                }
                _ => {}
            }

            if polls >= self.max_polls {
                warn!("Prediction still '{}' after {} polls", status, polls);
                return Err(ApiFailure::Timeout);
            }

            let poll_url = prediction
                .get("urls")
                .and_then(|urls| urls.get("get"))
                .and_then(Value::as_str)
                .ok_or_else(|| ApiFailure::InvalidResponse("prediction has no poll URL".to_string()))?
                .to_string();

            debug!("Prediction status '{}', polling {}", status, poll_url);
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.fetch_prediction(&poll_url).await?;
            polls += 1;
        }
    }

    async fn download(&self, url: &str) -> Result<RawImage, ApiFailure> {
        let response = self.client.get(url).send().await.map_err(transport_failure)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiFailure::from_status(status.as_u16(), "image download failed"));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(transport_failure)?;

        Ok(RawImage::new(bytes.to_vec(), content_type))
    }
}

/// First output URL; the API returns either a list or a single string
fn first_output_url(prediction: &Value) -> Option<&str> {
    match prediction.get("output")? {
        Value::Array(items) => items.first().and_then(Value::as_str),
        Value::String(url) => Some(url.as_str()),
        _ => None,
    }
}

#[async_trait]
impl ImageGenerator for ReplicateImageGenerator {
    async fn generate_image(&self, prompt: &str) -> GeneratorResult<RawImage> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GeneratorError::invalid("image generation prompt must be non-empty"));
        }

        let preview: String = prompt.chars().take(80).collect();
        info!("Replicate image generation started. Prompt: {}...", preview);

        let created = self.create_prediction(prompt).await.map_err(|e| self.failure(e))?;
        let finished = self.wait_for_prediction(created).await.map_err(|e| self.failure(e))?;

        let url = first_output_url(&finished)
            .ok_or_else(|| GeneratorError::empty(format!("{PROVIDER} ({LABEL})")))?
            .to_string();

        let image = self.download(&url).await.map_err(|e| self.failure(e))?;
        if image.is_empty() {
            return Err(GeneratorError::empty(format!("{PROVIDER} image download")));
        }

        info!("Image downloaded: {} bytes", image.len());
        Ok(image)
    }
}
