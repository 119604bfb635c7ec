//! Main entry point for the orchestrator binary
//!
//! One-shot operator commands: run the workflow once (for cron), inspect the
//! rotation pointer, bootstrap or inspect the publishing tokens.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use orchestrator::{AppConfig, ItemRotation, OrchestratorResult, Services};
use shared::{logging, process_error, process_info, ProcessId, TriggerResponse};

/// Word-of-the-day autopilot
#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "Generates and publishes the next word-of-the-day post")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error); defaults to LOG_LEVEL
    #[arg(long)]
    pub log_level: Option<String>,

    /// Data directory holding words.txt, hashtags.txt and state files; defaults to DATA_DIR
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full workflow once and print the report
    Run,
    /// Print the rotation status
    Status,
    /// Exchange a short-lived user token for long-lived credentials
    Bootstrap {
        /// Short-lived user access token from the Graph API Explorer
        #[arg(long, env = "FB_USER_ACCESS_TOKEN")]
        token: String,
    },
    /// Print token expiry information
    Tokens,
    /// Ensure a valid page token and check it against debug_token
    CheckToken,
}

fn print_json<T: serde::Serialize>(value: &T) -> OrchestratorResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn execute(command: Command, services: &Services) -> OrchestratorResult<bool> {
    match command {
        Command::Run => {
            let report = services.workflow.run().await?;
            print_json(&TriggerResponse::from(&report))?;
            Ok(report.is_success())
        }
        Command::Status => {
            print_json(&services.rotation.status().await?)?;
            Ok(true)
        }
        Command::Bootstrap { token } => {
            services.tokens.bootstrap(&token).await?;
            print_json(&services.tokens.token_report())?;
            Ok(true)
        }
        Command::Tokens => {
            print_json(&services.tokens.token_report())?;
            Ok(true)
        }
        Command::CheckToken => {
            let token = services.tokens.ensure_valid_token().await?;
            let valid = services.tokens.validate_live(&token).await;
            print_json(&serde_json::json!({ "valid": valid }))?;
            Ok(valid)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize process ID singleton for orchestrator
    ProcessId::init_orchestrator();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init_tracing_with_level(args.log_level.as_deref());
            logging::log_error(ProcessId::current(), "Configuration", &e);
            return ExitCode::FAILURE;
        }
    };
    let config = match &args.data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    };
    let config = match args.log_level {
        Some(level) => config.with_log_level(level),
        None => config,
    };

    logging::init_tracing_with_level(Some(&config.log_level));
    process_info!(ProcessId::current(), "Data directory: {}", config.data_dir.display());

    let services = match Services::from_config(&config) {
        Ok(services) => services,
        Err(e) => {
            logging::log_error(ProcessId::current(), "Startup", &e);
            return ExitCode::FAILURE;
        }
    };

    match execute(args.command, &services).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            process_error!(ProcessId::current(), kind = %e.kind(), "{}", e);
            ExitCode::FAILURE
        }
    }
}
