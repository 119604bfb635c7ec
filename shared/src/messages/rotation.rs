//! Rotation status message

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Read-only view of the rotation pointer, served by the status surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationStatus {
    pub current_index: usize,
    pub total_processed: u64,
    #[serde(rename = "last_word")]
    pub last_item: String,
    /// `None` when the item list could not be read; `-1` on the wire
    #[serde(
        rename = "total_words_in_list",
        serialize_with = "unknown_as_negative",
        deserialize_with = "negative_as_unknown"
    )]
    pub total_items: Option<usize>,
}

fn unknown_as_negative<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(count) => serializer.serialize_i64(*count as i64),
        None => serializer.serialize_i64(-1),
    }
}

fn negative_as_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(usize::try_from(raw).ok())
}
