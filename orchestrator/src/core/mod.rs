//! Core business logic modules
//!
//! Pure state transitions with no I/O: the callers in `services` load and
//! persist the documents these functions operate on.

pub mod rotation;
pub mod tokens;

pub use rotation::RotationState;
pub use tokens::{
    plan_token_action, LongLivedGrant, ServiceGrant, TokenAction, TokenExpiry, TokenKind, TokenRecord,
    TokenReport, TokenStore, DEFAULT_LONG_LIVED_SECS, REFRESH_WINDOW_SECS,
};
