//! Request plumbing shared by the provider clients

use std::time::Duration;

use shared::ApiFailure;
use crate::error::{GeneratorError, GeneratorResult};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn build_client(timeout: Duration) -> GeneratorResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GeneratorError::ConfigError {
            message: format!("failed to build HTTP client: {e}"),
        })
}

pub(crate) fn transport_failure(err: reqwest::Error) -> ApiFailure {
    if err.is_timeout() {
        ApiFailure::Timeout
    } else {
        ApiFailure::NetworkError(err.to_string())
    }
}

/// Check the status and decode a JSON body
pub(crate) async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ApiFailure> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiFailure::from_status(status.as_u16(), &body));
    }

    response
        .json()
        .await
        .map_err(|e| ApiFailure::InvalidResponse(format!("Failed to parse response: {e}")))
}

pub(crate) fn usage_field(usage: Option<&serde_json::Value>, field: &str) -> u32 {
    usage
        .and_then(|u| u.get(field))
        .and_then(|t| t.as_u64())
        .unwrap_or(0) as u32
}
