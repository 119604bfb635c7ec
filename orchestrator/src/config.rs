//! Application configuration
//!
//! Values come from a `.env` file (if present) overlaid by the process
//! environment. Every missing required key is reported in one error.

use std::path::{Path, PathBuf};

use generator::TextProvider;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::services::{GraphCredentials, LockMode};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const WORDS_FILE: &str = "words.txt";
pub const HASHTAGS_FILE: &str = "hashtags.txt";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub anthropic_api_key: Option<String>,
    pub replicate_api_token: String,
    pub text_provider: TextProvider,
    pub facebook: GraphCredentials,
    /// Short-lived user token used for the first bootstrap
    pub fb_user_access_token: Option<String>,
    pub webhook_secret: Option<String>,
    pub log_level: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub prompts_dir: PathBuf,
    pub lock_mode: LockMode,
}

impl AppConfig {
    /// Load from `.env` and the process environment
    pub fn from_env() -> OrchestratorResult<Self> {
        // Missing .env is fine; real environment variables win over it
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> OrchestratorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| match get(key) {
            Some(value) => value,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let openai_api_key = required("OPENAI_API_KEY");
        let replicate_api_token = required("REPLICATE_API_TOKEN");
        let app_id = required("FB_APP_ID");
        let app_secret = required("FB_APP_SECRET");
        let page_id = required("FB_PAGE_ID");

        let text_provider = get("TEXT_GENERATION_PROVIDER")
            .unwrap_or_default()
            .parse::<TextProvider>()
            .map_err(|e| OrchestratorError::config(e.to_string()))?;
        let anthropic_api_key = get("ANTHROPIC_API_KEY");
        if text_provider == TextProvider::Claude && anthropic_api_key.is_none() {
            missing.push("ANTHROPIC_API_KEY");
        }

        if !missing.is_empty() {
            return Err(OrchestratorError::config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| OrchestratorError::config(format!("PORT must be a port number, got '{raw}'")))?,
            None => DEFAULT_PORT,
        };
        let lock_mode = get("LOCK_MODE").unwrap_or_default().parse::<LockMode>()?;
        let dir = |key: &str, default: &str| PathBuf::from(get(key).unwrap_or_else(|| default.to_string()));

        Ok(Self {
            openai_api_key,
            anthropic_api_key,
            replicate_api_token,
            text_provider,
            facebook: GraphCredentials {
                app_id,
                app_secret,
                page_id,
            },
            fb_user_access_token: get("FB_USER_ACCESS_TOKEN"),
            webhook_secret: get("WEBHOOK_SECRET"),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            port,
            data_dir: dir("DATA_DIR", "./data"),
            output_dir: dir("OUTPUT_DIR", "./output"),
            logs_dir: dir("LOGS_DIR", "./logs"),
            prompts_dir: dir("PROMPTS_DIR", "./prompts"),
            lock_mode,
        })
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn words_path(&self) -> PathBuf {
        self.data_dir.join(WORDS_FILE)
    }

    pub fn hashtags_path(&self) -> PathBuf {
        self.data_dir.join(HASHTAGS_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
