//! Facebook Graph API client
//!
//! One client serves both the OAuth hops used by the token manager and the
//! photo upload used by the publish stage.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shared::{process_debug, process_info, process_warn, ApiFailure, ProcessId};
use crate::core::{LongLivedGrant, ServiceGrant};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{OAuthProvider, Publisher};

pub const GRAPH_BASE_URL: &str = "https://graph.facebook.com";
pub const GRAPH_VERSION: &str = "v21.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Facebook app and page identity
#[derive(Debug, Clone)]
pub struct GraphCredentials {
    pub app_id: String,
    pub app_secret: String,
    pub page_id: String,
}

pub struct GraphApiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: GraphCredentials,
    hashtags_path: PathBuf,
}

impl GraphApiClient {
    pub fn new(credentials: GraphCredentials, hashtags_path: impl Into<PathBuf>) -> OrchestratorResult<Self> {
        Self::with_base_url(credentials, hashtags_path, GRAPH_BASE_URL)
    }

    pub fn with_base_url(
        credentials: GraphCredentials,
        hashtags_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> OrchestratorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| OrchestratorError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: format!("{}/{}", base_url.into().trim_end_matches('/'), GRAPH_VERSION),
            credentials,
            hashtags_path: hashtags_path.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn app_token(&self) -> String {
        format!("{}|{}", self.credentials.app_id, self.credentials.app_secret)
    }

    async fn graph_get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ApiFailure> {
        let response = self
            .client
            .get(self.url(path))
            .query(params)
            .send()
            .await
            .map_err(transport_failure)?;
        read_graph_response(response).await
    }

    /// Hashtag line appended to every caption, if the hashtag file exists
    pub fn load_hashtags(&self) -> Option<String> {
        match std::fs::read_to_string(&self.hashtags_path) {
            Ok(raw) => {
                let tags: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                (!tags.is_empty()).then(|| tags.join(" "))
            }
            Err(_) => {
                process_warn!(
                    ProcessId::current(),
                    "Hashtags file not found at {}. Posting without hashtags.",
                    self.hashtags_path.display()
                );
                None
            }
        }
    }
}

fn transport_failure(err: reqwest::Error) -> ApiFailure {
    if err.is_timeout() {
        ApiFailure::Timeout
    } else {
        ApiFailure::NetworkError(err.to_string())
    }
}

/// Graph reports most failures as an `error` object, often with a 400 status
async fn read_graph_response(response: reqwest::Response) -> Result<Value, ApiFailure> {
    let status = response.status();
    let body = response.text().await.map_err(transport_failure)?;
    let parsed: Option<Value> = serde_json::from_str(&body).ok();

    if let Some(error) = parsed.as_ref().and_then(|v| v.get("error")) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(match status.as_u16() {
            401 | 403 => ApiFailure::AuthenticationFailed,
            429 => ApiFailure::RateLimitExceeded,
            _ => ApiFailure::InvalidRequest(format!("Graph API error: {message}")),
        });
    }
    if !status.is_success() {
        return Err(ApiFailure::from_status(status.as_u16(), &body));
    }
    parsed.ok_or_else(|| ApiFailure::InvalidResponse("response is not JSON".to_string()))
}

/// Caption = post text, blank line, hashtags
pub fn compose_caption(text: &str, hashtags: Option<&str>) -> String {
    match hashtags {
        Some(tags) if !tags.trim().is_empty() => format!("{}\n\n{}", text.trim(), tags.trim()),
        _ => text.trim().to_string(),
    }
}

#[async_trait]
impl OAuthProvider for GraphApiClient {
    async fn exchange_long_lived(&self, token: &str) -> OrchestratorResult<LongLivedGrant> {
        process_info!(ProcessId::current(), "Exchanging for long-lived user token");
        let data = self
            .graph_get(
                "oauth/access_token",
                &[
                    ("grant_type", "fb_exchange_token"),
                    ("client_id", self.credentials.app_id.as_str()),
                    ("client_secret", self.credentials.app_secret.as_str()),
                    ("fb_exchange_token", token),
                ],
            )
            .await
            .map_err(|e| OrchestratorError::graph("oauth/access_token", e))?;

        let access_token = data
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                OrchestratorError::graph(
                    "oauth/access_token",
                    ApiFailure::InvalidResponse("no access_token in response".to_string()),
                )
            })?;

        Ok(LongLivedGrant {
            token: access_token.to_string(),
            expires_in: data.get("expires_in").and_then(Value::as_i64),
        })
    }

    async fn derive_service_token(&self, user_token: &str) -> OrchestratorResult<ServiceGrant> {
        let page_id = self.credentials.page_id.as_str();
        process_info!(ProcessId::current(), "Fetching page access token for page {}", page_id);
        let data = self
            .graph_get(page_id, &[("fields", "access_token,name"), ("access_token", user_token)])
            .await
            .map_err(|e| OrchestratorError::graph("page token", e))?;

        let access_token = data.get("access_token").and_then(Value::as_str).ok_or_else(|| {
            OrchestratorError::graph(
                "page token",
                ApiFailure::InvalidResponse("no access_token in response".to_string()),
            )
        })?;

        Ok(ServiceGrant {
            token: access_token.to_string(),
            expires_at: None,
            page_name: data.get("name").and_then(Value::as_str).map(str::to_string),
        })
    }

    async fn introspect_token(&self, token: &str) -> OrchestratorResult<bool> {
        let app_token = self.app_token();
        let data = self
            .graph_get("debug_token", &[("input_token", token), ("access_token", app_token.as_str())])
            .await
            .map_err(|e| OrchestratorError::graph("debug_token", e))?;

        let info = data.get("data").cloned().unwrap_or(Value::Null);
        let is_valid = info.get("is_valid").and_then(Value::as_bool).unwrap_or(false);
        if !is_valid {
            process_debug!(ProcessId::current(), "debug_token reports invalid token: {}", info);
        }
        Ok(is_valid)
    }
}

#[async_trait]
impl Publisher for GraphApiClient {
    async fn publish(&self, text: &str, image_path: &Path, credential: &str) -> OrchestratorResult<String> {
        let publish_error = |message: String| OrchestratorError::PublishError { message };

        if text.trim().is_empty() {
            return Err(publish_error("post text must be non-empty".to_string()));
        }
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| publish_error(format!("image file {} unreadable: {e}", image_path.display())))?;

        let caption = compose_caption(text, self.load_hashtags().as_deref());
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "post.jpg".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")
            .map_err(|e| publish_error(e.to_string()))?;
        let form = Form::new()
            .text("message", caption)
            .text("access_token", credential.to_string())
            .part("source", part);

        process_info!(ProcessId::current(), "Posting to Facebook page {}", self.credentials.page_id);
        let response = self
            .client
            .post(self.url(&format!("{}/photos", self.credentials.page_id)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| publish_error(transport_failure(e).to_string()))?;
        let result = read_graph_response(response)
            .await
            .map_err(|e| publish_error(e.to_string()))?;

        let post_id = result
            .get("post_id")
            .or_else(|| result.get("id"))
            .and_then(Value::as_str)
            .ok_or_else(|| publish_error("response carried no post id".to_string()))?;

        process_info!(ProcessId::current(), "Posted successfully. Post ID: {}", post_id);
        Ok(post_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_with_hashtags() {
        assert_eq!(compose_caption(" body \n", Some("#a #b")), "body\n\n#a #b");
    }

    #[test]
    fn test_caption_without_hashtags() {
        assert_eq!(compose_caption("body", None), "body");
        assert_eq!(compose_caption("body", Some("  ")), "body");
    }
}
