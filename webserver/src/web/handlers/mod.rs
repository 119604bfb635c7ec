//! HTTP request handlers

pub mod api;

pub use api::{health_check, status_handler, trigger_handler, WEBHOOK_SECRET_HEADER};
