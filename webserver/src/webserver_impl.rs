//! Main webserver implementation

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use shared::{logging, ProcessId};
use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;
use crate::web::handlers::{health_check, status_handler, trigger_handler};

#[derive(Clone)]
pub struct WebServer {
    state: Arc<WebServerState>,
}

impl WebServer {
    pub fn new(state: WebServerState) -> Self {
        Self { state: Arc::new(state) }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/webhook/trigger", post(trigger_handler))
            .route("/status", get(status_handler))
            .route("/health", get(health_check))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.state.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(&self, addr: SocketAddr, shutdown: F) -> WebServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| WebServerError::ServerStartupFailed {
                address: addr.to_string(),
                source,
            })?;

        logging::log_startup(ProcessId::current(), &format!("HTTP server listening on {addr}"));
        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
