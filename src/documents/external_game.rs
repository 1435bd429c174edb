use serde::{Deserialize, Serialize};

use super::Platform;

/// Document type under 'external_games/{platform}_{platform_title_id}' that
/// maps a platform-native title to its catalog game.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct ExternalGame {
    pub catalog_id: u64,
    pub store_id: String,
    pub store_name: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,
}

impl ExternalGame {
    pub fn doc_id(platform: Platform, platform_title_id: &str) -> String {
        format!("{}_{}", platform.name(), platform_title_id)
    }
}
