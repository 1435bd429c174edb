use serde::{Deserialize, Serialize};

/// A title observed on a remote platform, normalized to the common shape.
///
/// Transient: never persisted as is. `catalog_id` stays `None` until the
/// identity resolver maps `platform_title_id` to a catalog game.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct PlatformRecord {
    pub platform_title_id: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<u64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default)]
    pub playtime_minutes: u64,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked_data: Option<serde_json::Value>,

    /// Unix seconds.
    #[serde(default)]
    pub last_observed_at: u64,
}
