//! Production wiring: every service is built once here and shared by `Arc`

use std::sync::Arc;

use generator::{
    build_text_generator, ChatImagePromptGenerator, FileCompositor, OpenAiChat, PromptTemplates,
    ReplicateImageGenerator,
};
use shared::{process_debug, ProcessId};
use crate::config::AppConfig;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::services::rotation_store::STATE_KEY;
use crate::services::token_manager::TOKENS_KEY;
use crate::services::{lock_for, FileItemSource, GraphApiClient, RotationStore, RunJournal, StateStore, TokenManager};
use crate::workflow::{Workflow, WorkflowAdapters, RUN_LOCK_KEY};

pub struct Services {
    pub rotation: Arc<RotationStore>,
    pub tokens: Arc<TokenManager>,
    pub workflow: Arc<Workflow>,
}

impl Services {
    /// Build the full service graph; fails fast on missing inputs
    pub fn from_config(config: &AppConfig) -> OrchestratorResult<Self> {
        let words_path = config.words_path();
        if !words_path.is_file() {
            return Err(OrchestratorError::config(format!(
                "word list not found at {}",
                words_path.display()
            )));
        }

        let state = StateStore::new(&config.data_dir);
        let state_lock = lock_for(config.lock_mode, &state.path_for(STATE_KEY));
        let tokens_lock = lock_for(config.lock_mode, &state.path_for(TOKENS_KEY));
        state.sweep_stale_temp_files(STATE_KEY, state_lock.as_ref())?;
        state.sweep_stale_temp_files(TOKENS_KEY, tokens_lock.as_ref())?;

        let rotation = Arc::new(RotationStore::new(
            Arc::new(FileItemSource::new(words_path)),
            state.clone(),
            state_lock,
        ));

        let graph = Arc::new(GraphApiClient::new(config.facebook.clone(), config.hashtags_path())?);
        let tokens = Arc::new(
            TokenManager::new(graph.clone(), state.clone(), tokens_lock)
                .with_bootstrap_token(config.fb_user_access_token.clone()),
        );

        let templates = Arc::new(PromptTemplates::load(&config.prompts_dir)?);
        let text = build_text_generator(
            config.text_provider,
            &config.openai_api_key,
            config.anthropic_api_key.as_deref(),
            templates.clone(),
        )?;
        let gpt = Arc::new(OpenAiChat::new(config.openai_api_key.as_str())?);

        let adapters = WorkflowAdapters {
            rotation: rotation.clone(),
            text,
            image_prompt: Arc::new(ChatImagePromptGenerator::new(gpt, templates)),
            images: Arc::new(ReplicateImageGenerator::new(config.replicate_api_token.as_str())?),
            compositor: Arc::new(FileCompositor::new(&config.output_dir)),
            credentials: tokens.clone(),
            publisher: graph,
        };
        let workflow = Arc::new(
            Workflow::new(adapters)
                .with_journal(RunJournal::in_dir(&config.logs_dir))
                .with_run_lock(lock_for(config.lock_mode, &state.path_for(RUN_LOCK_KEY))),
        );

        process_debug!(
            ProcessId::current(),
            "Services ready: data={}, lock mode={}, text provider={}",
            config.data_dir.display(),
            config.lock_mode,
            config.text_provider
        );

        Ok(Self {
            rotation,
            tokens,
            workflow,
        })
    }
}
