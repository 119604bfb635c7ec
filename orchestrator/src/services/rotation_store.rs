//! Crash-safe rotation over the item list
//!
//! `next_item` is one critical section: load list, load state, pick, persist.
//! If the write fails the call fails and the pointer stays where it was.

use async_trait::async_trait;
use std::sync::Arc;

use shared::{process_info, process_warn, ProcessId, RotationStatus};
use super::StateStore;
use crate::core::RotationState;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{ItemRotation, ItemSource, StoreLock};

pub const STATE_KEY: &str = "state.json";

#[derive(Clone)]
pub struct RotationStore {
    items: Arc<dyn ItemSource>,
    store: StateStore,
    lock: Arc<dyn StoreLock>,
}

impl RotationStore {
    pub fn new(items: Arc<dyn ItemSource>, store: StateStore, lock: Arc<dyn StoreLock>) -> Self {
        Self { items, store, lock }
    }

    /// Blocking form of [`ItemRotation::next_item`]
    pub fn next_item_blocking(&self) -> OrchestratorResult<String> {
        let _guard = self.lock.acquire()?;

        let items = self.items.load_items()?;
        let state: RotationState = self.store.read_or_default(STATE_KEY);
        let (item, next) = state.advance(&items).ok_or_else(|| OrchestratorError::EmptyList {
            source_name: self.items.describe(),
        })?;

        self.store.write(STATE_KEY, &next)?;

        process_info!(
            ProcessId::current(),
            "Selected word '{}' (index {}/{}, total processed {})",
            item,
            state.current_index % items.len(),
            items.len(),
            next.total_processed
        );
        Ok(item)
    }

    /// Blocking form of [`ItemRotation::status`]; never fails on a bad list
    pub fn status_blocking(&self) -> RotationStatus {
        let state: RotationState = self.store.read_or_default(STATE_KEY);
        let total_items = match self.items.load_items() {
            Ok(items) => Some(items.len()),
            Err(e) => {
                process_warn!(ProcessId::current(), "Word list unavailable for status: {}", e);
                None
            }
        };
        state.to_status(total_items)
    }
}

#[async_trait]
impl ItemRotation for RotationStore {
    async fn next_item(&self) -> OrchestratorResult<String> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.next_item_blocking()).await?
    }

    async fn status(&self) -> OrchestratorResult<RotationStatus> {
        let this = self.clone();
        Ok(tokio::task::spawn_blocking(move || this.status_blocking()).await?)
    }
}
