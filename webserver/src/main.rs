//! WebServer entry point
//!
//! Long-running trigger surface: an external scheduler POSTs to
//! `/webhook/trigger` once a day.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;

use orchestrator::{AppConfig, Services};
use shared::{logging, process_info, ProcessId};
use webserver::{WebServer, WebServerError, WebServerResult, WebServerState};

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "HTTP trigger for the word-of-the-day workflow")]
struct Args {
    /// Port for the HTTP server; defaults to PORT
    #[arg(long)]
    port: Option<u16>,

    /// Bind host
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Log level (trace, debug, info, warn, error); defaults to LOG_LEVEL
    #[arg(long)]
    log_level: Option<String>,

    /// Data directory holding words.txt, hashtags.txt and state files; defaults to DATA_DIR
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal"),
        Err(err) => logging::log_error(ProcessId::current(), "Signal handling", &err),
    }
}

#[tokio::main]
async fn main() -> WebServerResult<()> {
    let args = Args::parse();

    // Initialize process ID singleton for webserver
    ProcessId::init_webserver();

    let mut config = AppConfig::from_env().inspect_err(|e| {
        logging::init_tracing_with_level(args.log_level.as_deref());
        logging::log_error(ProcessId::current(), "Configuration", e);
    })?;
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(level) = args.log_level {
        config = config.with_log_level(level);
    }
    logging::init_tracing_with_level(Some(&config.log_level));

    let addr: SocketAddr = format!("{}:{}", args.host, config.port)
        .parse()
        .map_err(|e| WebServerError::InvalidAddress {
            details: format!("{}:{}: {e}", args.host, config.port),
        })?;

    let services = Services::from_config(&config).inspect_err(|e| {
        logging::log_error(ProcessId::current(), "Startup", e);
    })?;
    process_info!(
        ProcessId::current(),
        "Webhook secret {}",
        if config.webhook_secret.is_some() { "required" } else { "not configured" }
    );

    let state = WebServerState::new(services.workflow, services.rotation).with_webhook_secret(config.webhook_secret);
    WebServer::new(state).run(addr, shutdown_signal()).await?;

    logging::log_success(ProcessId::current(), "WebServer stopped gracefully");
    Ok(())
}
