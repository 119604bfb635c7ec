//! Token lifecycle automaton
//!
//! A token store moves through three states: empty (needs bootstrap),
//! bootstrapped with a healthy user token (serve the stored page token) and
//! bootstrapped with an expiring or expired user token (refresh). All times
//! are unix seconds.

use serde::{Deserialize, Serialize};

/// Refresh once the user token has less than this left
pub const REFRESH_WINDOW_SECS: i64 = 10 * 24 * 3600;

/// Validity assumed when the exchange response omits `expires_in`
pub const DEFAULT_LONG_LIVED_SECS: i64 = 60 * 24 * 3600;

const SECS_PER_DAY: f64 = 24.0 * 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    #[serde(rename = "long_lived_user")]
    LongLivedUser,
    #[serde(rename = "page")]
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    /// `None` never expires
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
}

impl TokenRecord {
    pub fn is_expiring_soon(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - now < REFRESH_WINDOW_SECS,
            None => false,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }

    pub fn needs_refresh(&self, now: i64) -> bool {
        self.is_expired(now) || self.is_expiring_soon(now)
    }

    pub fn expiry(&self, now: i64) -> TokenExpiry {
        TokenExpiry {
            kind: self.kind,
            expires_at: self.expires_at,
            days_remaining: self
                .expires_at
                .map(|at| ((at - now) as f64 / SECS_PER_DAY * 10.0).round() / 10.0),
            expiring_soon: self.is_expiring_soon(now),
            expired: self.is_expired(now),
            page_name: self.page_name.clone(),
        }
    }
}

/// Persisted credential document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_token: Option<TokenRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<TokenRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrapped_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<i64>,
}

impl TokenStore {
    /// A page token without the user token it was derived from cannot be renewed
    pub fn is_consistent(&self) -> bool {
        self.page_token.is_none() || self.user_token.is_some()
    }

    pub fn report(&self, now: i64) -> TokenReport {
        TokenReport {
            bootstrapped_at: self.bootstrapped_at,
            last_refresh: self.last_refresh,
            user_token: self.user_token.as_ref().map(|t| t.expiry(now)),
            page_token: self.page_token.as_ref().map(|t| t.expiry(now)),
        }
    }
}

/// Result of exchanging a short-lived (or current) user token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongLivedGrant {
    pub token: String,
    pub expires_in: Option<i64>,
}

impl LongLivedGrant {
    pub fn into_record(self, now: i64) -> TokenRecord {
        TokenRecord {
            token: self.token,
            expires_at: Some(now + self.expires_in.unwrap_or(DEFAULT_LONG_LIVED_SECS)),
            kind: TokenKind::LongLivedUser,
            page_name: None,
        }
    }
}

/// Page credential derived from a long-lived user token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceGrant {
    pub token: String,
    pub expires_at: Option<i64>,
    pub page_name: Option<String>,
}

impl ServiceGrant {
    pub fn into_record(self) -> TokenRecord {
        TokenRecord {
            token: self.token,
            expires_at: self.expires_at,
            kind: TokenKind::Page,
            page_name: self.page_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAction {
    /// Stored page token is good to use
    UseStored(String),
    /// Run the two-hop exchange with the stored user token
    Refresh(String),
    /// No usable user token; an out-of-band short-lived token is needed
    Bootstrap,
}

/// Decide what `ensure_valid_token` must do; expiry is judged on the user token
pub fn plan_token_action(store: &TokenStore, now: i64) -> TokenAction {
    let Some(user) = store.user_token.as_ref() else {
        return TokenAction::Bootstrap;
    };
    match store.page_token.as_ref() {
        Some(page) if !user.needs_refresh(now) => TokenAction::UseStored(page.token.clone()),
        _ => TokenAction::Refresh(user.token.clone()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenExpiry {
    pub kind: TokenKind,
    pub expires_at: Option<i64>,
    pub days_remaining: Option<f64>,
    pub expiring_soon: bool,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
}

/// Operator-facing view of the token store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenReport {
    pub bootstrapped_at: Option<i64>,
    pub last_refresh: Option<i64>,
    pub user_token: Option<TokenExpiry>,
    pub page_token: Option<TokenExpiry>,
}
