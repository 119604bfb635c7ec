//! Token lifecycle manager
//!
//! Keeps a page access token usable indefinitely: bootstraps from an
//! out-of-band short-lived user token, then re-runs the two-hop exchange with
//! the stored long-lived user token whenever it is inside the refresh window.
//! Bootstrap and refresh are serialized by an async mutex plus the token
//! file's store lock, both held across the network calls.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use shared::{process_error, process_info, process_warn, ProcessId};
use super::StateStore;
use crate::core::{plan_token_action, TokenAction, TokenReport, TokenStore};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{CredentialProvider, LockGuard, OAuthProvider, StoreLock};

pub const TOKENS_KEY: &str = "fb_tokens.json";

pub struct TokenManager {
    oauth: Arc<dyn OAuthProvider>,
    store: StateStore,
    lock: Arc<dyn StoreLock>,
    bootstrap_token: Option<String>,
    in_flight: Mutex<()>,
}

#[derive(Clone, Copy)]
enum Hop {
    Bootstrap,
    Refresh,
}

impl TokenManager {
    pub fn new(oauth: Arc<dyn OAuthProvider>, store: StateStore, lock: Arc<dyn StoreLock>) -> Self {
        Self {
            oauth,
            store,
            lock,
            bootstrap_token: None,
            in_flight: Mutex::new(()),
        }
    }

    /// Short-lived token used when the store is empty
    pub fn with_bootstrap_token(mut self, token: Option<String>) -> Self {
        self.bootstrap_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    async fn acquire_store_lock(&self) -> OrchestratorResult<LockGuard> {
        let lock = self.lock.clone();
        tokio::task::spawn_blocking(move || lock.acquire()).await?
    }

    /// Exchange `token` for a long-lived user token, derive the page token, persist both
    async fn two_hop(&self, token: &str, hop: Hop, previous: &TokenStore) -> OrchestratorResult<String> {
        let wrap = |e: OrchestratorError| match hop {
            Hop::Bootstrap => OrchestratorError::TokenBootstrapRequired {
                message: format!("bootstrap exchange failed: {e}"),
            },
            Hop::Refresh => OrchestratorError::TokenRefreshError {
                message: format!("{e}. Re-bootstrap with a fresh short-lived token"),
            },
        };

        let now = Utc::now().timestamp();
        let long_lived = self.oauth.exchange_long_lived(token).await.map_err(wrap)?;
        let user_record = long_lived.into_record(now);
        let page_record = self
            .oauth
            .derive_service_token(&user_record.token)
            .await
            .map_err(wrap)?
            .into_record();

        let page_token = page_record.token.clone();
        let user_expiry = user_record.expires_at;
        let page_name = page_record.page_name.clone().unwrap_or_else(|| "unknown page".to_string());

        let updated = match hop {
            Hop::Bootstrap => TokenStore {
                user_token: Some(user_record),
                page_token: Some(page_record),
                bootstrapped_at: Some(now),
                last_refresh: None,
            },
            Hop::Refresh => TokenStore {
                user_token: Some(user_record),
                page_token: Some(page_record),
                bootstrapped_at: previous.bootstrapped_at,
                last_refresh: Some(now),
            },
        };
        self.store.write(TOKENS_KEY, &updated).map_err(|e| {
            let message = format!(
                "new tokens were exchanged but not saved ({e}). The stored user token may already be \
                 superseded; re-bootstrap with a fresh short-lived token"
            );
            match hop {
                Hop::Bootstrap => OrchestratorError::TokenBootstrapRequired { message },
                Hop::Refresh => OrchestratorError::TokenRefreshError { message },
            }
        })?;

        let expiry = user_expiry
            .and_then(|at| chrono::DateTime::from_timestamp(at, 0))
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string());
        match hop {
            Hop::Bootstrap => process_info!(
                ProcessId::current(),
                "Bootstrap complete for '{}'. User token expires {}",
                page_name,
                expiry
            ),
            Hop::Refresh => process_info!(
                ProcessId::current(),
                "Tokens refreshed for '{}'. User token now expires {}",
                page_name,
                expiry
            ),
        }
        Ok(page_token)
    }

    /// Run the bootstrap exchange unconditionally, replacing any stored tokens
    pub async fn bootstrap(&self, short_lived_token: &str) -> OrchestratorResult<String> {
        if short_lived_token.trim().is_empty() {
            return Err(OrchestratorError::TokenBootstrapRequired {
                message: "bootstrap token is empty".to_string(),
            });
        }
        let _serial = self.in_flight.lock().await;
        let _file = self.acquire_store_lock().await?;
        let previous: TokenStore = self.store.read_or_default(TOKENS_KEY);

        process_info!(ProcessId::current(), "Bootstrapping tokens from short-lived user token");
        self.two_hop(short_lived_token.trim(), Hop::Bootstrap, &previous).await
    }

    /// Return a page token that is valid now, bootstrapping or refreshing as needed
    pub async fn ensure_valid_token(&self) -> OrchestratorResult<String> {
        let _serial = self.in_flight.lock().await;
        let _file = self.acquire_store_lock().await?;

        let tokens: TokenStore = self.store.read_or_default(TOKENS_KEY);
        if !tokens.is_consistent() {
            process_warn!(
                ProcessId::current(),
                kind = "StateCorruptionWarning",
                "Token store has a page token but no user token; treating as empty"
            );
        }

        match plan_token_action(&tokens, Utc::now().timestamp()) {
            TokenAction::UseStored(page_token) => Ok(page_token),
            TokenAction::Refresh(user_token) => {
                process_info!(ProcessId::current(), "User token expiring soon or page token missing. Refreshing");
                self.two_hop(&user_token, Hop::Refresh, &tokens).await
            }
            TokenAction::Bootstrap => {
                let Some(short) = self.bootstrap_token.as_deref() else {
                    return Err(OrchestratorError::TokenBootstrapRequired {
                        message: "no user token stored and FB_USER_ACCESS_TOKEN is not set".to_string(),
                    });
                };
                process_info!(ProcessId::current(), "No stored tokens. Bootstrapping from FB_USER_ACCESS_TOKEN");
                self.two_hop(short, Hop::Bootstrap, &tokens).await
            }
        }
    }

    /// Introspect `token`; any failure to inspect counts as invalid
    pub async fn validate_live(&self, token: &str) -> bool {
        match self.oauth.introspect_token(token).await {
            Ok(true) => true,
            Ok(false) => {
                process_warn!(ProcessId::current(), "Token is invalid per debug_token");
                false
            }
            Err(e) => {
                process_error!(ProcessId::current(), "Token validation failed: {}", e);
                false
            }
        }
    }

    /// Expiry overview of the stored tokens
    pub fn token_report(&self) -> TokenReport {
        let tokens: TokenStore = self.store.read_or_default(TOKENS_KEY);
        tokens.report(Utc::now().timestamp())
    }
}

#[async_trait]
impl CredentialProvider for TokenManager {
    async fn ensure_valid_token(&self) -> OrchestratorResult<String> {
        TokenManager::ensure_valid_token(self).await
    }

    async fn validate_live(&self, token: &str) -> bool {
        TokenManager::validate_live(self, token).await
    }
}
