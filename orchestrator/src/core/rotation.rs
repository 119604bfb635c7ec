//! Rotation pointer arithmetic

use serde::{Deserialize, Serialize};

use shared::RotationStatus;

/// Persisted position in the item list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    #[serde(default, alias = "currentIndex")]
    pub current_index: usize,
    #[serde(default, alias = "totalProcessed")]
    pub total_processed: u64,
    #[serde(default, rename = "last_word", alias = "lastItem")]
    pub last_item: String,
}

impl RotationState {
    /// Pick the item under the pointer and compute the state after it
    ///
    /// The stored index is reduced modulo the list length first, so a list
    /// that shrank since the last run keeps rotating instead of failing.
    /// Returns `None` for an empty list.
    pub fn advance(&self, items: &[String]) -> Option<(String, RotationState)> {
        if items.is_empty() {
            return None;
        }
        let index = self.current_index % items.len();
        let item = items[index].clone();
        let next = RotationState {
            current_index: (index + 1) % items.len(),
            total_processed: self.total_processed + 1,
            last_item: item.clone(),
        };
        Some((item, next))
    }

    pub fn to_status(&self, total_items: Option<usize>) -> RotationStatus {
        RotationStatus {
            current_index: self.current_index,
            total_processed: self.total_processed,
            last_item: self.last_item.clone(),
            total_items,
        }
    }
}
