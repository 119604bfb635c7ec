//! REST API handlers
//!
//! The trigger always answers with a structured [`TriggerResponse`] body,
//! whatever the status code.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use orchestrator::{ItemRotation, OrchestratorError};
use shared::{process_error, process_info, process_warn, ErrorKind, ProcessId, RotationStatus, TriggerResponse};
use crate::state::WebServerState;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Run the workflow once - POST /webhook/trigger
///
/// The run executes on its own task, so a client that disconnects mid-run
/// does not cancel a stage halfway through.
pub async fn trigger_handler(
    State(state): State<Arc<WebServerState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<TriggerResponse>) {
    let provided = headers.get(WEBHOOK_SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !state.authorizes(provided) {
        process_warn!(ProcessId::current(), "Webhook trigger rejected: bad or missing secret");
        return (StatusCode::UNAUTHORIZED, Json(TriggerResponse::error("Unauthorized")));
    }

    process_info!(ProcessId::current(), "Workflow triggered via webhook");
    let workflow = state.workflow.clone();
    let run = tokio::spawn(async move { workflow.run().await });

    match run.await {
        Ok(Ok(report)) => {
            let status = if report.is_success() {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(TriggerResponse::from(&report)))
        }
        Ok(Err(OrchestratorError::AlreadyRunning)) => (
            StatusCode::CONFLICT,
            Json(TriggerResponse::rejected(
                ErrorKind::AlreadyRunning,
                OrchestratorError::AlreadyRunning.to_string(),
            )),
        ),
        Ok(Err(e)) => {
            process_error!(ProcessId::current(), kind = %e.kind(), "Workflow could not start: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TriggerResponse::rejected(e.kind(), e.to_string())),
            )
        }
        Err(join_error) => {
            let e = OrchestratorError::from(join_error);
            process_error!(ProcessId::current(), "Workflow task aborted: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TriggerResponse::rejected(e.kind(), e.to_string())),
            )
        }
    }
}

/// Rotation pointer - GET /status
pub async fn status_handler(
    State(state): State<Arc<WebServerState>>,
) -> Result<Json<RotationStatus>, (StatusCode, Json<Value>)> {
    state.rotation.status().await.map(Json).map_err(|e| {
        process_error!(ProcessId::current(), "Status lookup failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string(), "errorKind": e.kind() })),
        )
    })
}

/// Liveness check - GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
