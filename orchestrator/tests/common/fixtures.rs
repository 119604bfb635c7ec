//! On-disk fixtures: word lists, stores and token documents

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use orchestrator::core::{TokenKind, TokenRecord, TokenStore};
use orchestrator::services::rotation_store::STATE_KEY;
use orchestrator::services::token_manager::TOKENS_KEY;
use orchestrator::services::{lock_for, FileItemSource, GraphCredentials, LockMode, RotationStore, StateStore};
use tempfile::TempDir;

pub struct TestFixtures;

impl TestFixtures {
    pub const DAY: i64 = 24 * 3600;
    pub const PAGE_ID: &'static str = "456";

    pub fn words(dir: &Path, words: &[&str]) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("words.txt"), words.join("\n")).unwrap();
    }

    /// Rotation store over `dir/words.txt` and `dir/state.json`
    pub fn rotation(dir: &Path, mode: LockMode) -> RotationStore {
        let state = StateStore::new(dir);
        let lock = lock_for(mode, &state.path_for(STATE_KEY));
        RotationStore::new(Arc::new(FileItemSource::new(dir.join("words.txt"))), state, lock)
    }

    pub fn rotation_with_words(words: &[&str]) -> (TempDir, RotationStore) {
        let dir = TempDir::new().unwrap();
        Self::words(dir.path(), words);
        let rotation = Self::rotation(dir.path(), LockMode::Advisory);
        (dir, rotation)
    }

    pub fn credentials() -> GraphCredentials {
        GraphCredentials {
            app_id: "app-id".to_string(),
            app_secret: "app-secret".to_string(),
            page_id: Self::PAGE_ID.to_string(),
        }
    }

    /// Token document whose user token expires `days` from now (`None` = never)
    pub fn token_store(user_days_left: Option<i64>) -> TokenStore {
        let now = Utc::now().timestamp();
        TokenStore {
            user_token: Some(TokenRecord {
                token: "stored-user".to_string(),
                expires_at: user_days_left.map(|days| now + days * Self::DAY),
                kind: TokenKind::LongLivedUser,
                page_name: None,
            }),
            page_token: Some(TokenRecord {
                token: "stored-page".to_string(),
                expires_at: None,
                kind: TokenKind::Page,
                page_name: Some("Daily Words".to_string()),
            }),
            bootstrapped_at: Some(now - 50 * Self::DAY),
            last_refresh: None,
        }
    }

    pub fn seed_tokens(dir: &Path, tokens: &TokenStore) {
        StateStore::new(dir).write(TOKENS_KEY, tokens).unwrap();
    }

    pub fn read_tokens(dir: &Path) -> TokenStore {
        StateStore::new(dir).read_or_default(TOKENS_KEY)
    }
}
