use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};
use valuable::Valuable;

use super::Platform;

/// Document type under 'users/{user_id}/library_entries/{catalog_id}'.
///
/// Exactly one entry exists per (user_id, catalog_id). The document id is the
/// catalog id, so uniqueness is enforced by the store key.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub id: String,
    pub user_id: String,
    pub catalog_id: u64,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub source_platforms: BTreeSet<Platform>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_app_id: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psn_title_id: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub riot_game_id: Option<String>,

    #[serde(default)]
    pub playtime_minutes: u64,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked_data: Option<serde_json::Value>,

    /// Unix seconds.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<u64>,

    /// Unix seconds.
    #[serde(default)]
    pub created_at: u64,

    /// Storage revision used for optimistic locking. Zero means the entry has
    /// not been stored yet.
    #[serde(default)]
    pub revision: u64,
}

impl LibraryEntry {
    pub fn new(user_id: &str, catalog_id: u64, created_at: u64) -> Self {
        LibraryEntry {
            id: catalog_id.to_string(),
            user_id: user_id.to_owned(),
            catalog_id,
            created_at,
            ..Default::default()
        }
    }

    pub fn set_platform_title_id(&mut self, platform: Platform, title_id: Option<String>) {
        match platform {
            Platform::Steam => self.steam_app_id = title_id,
            Platform::PlayStation => self.psn_title_id = title_id,
            Platform::Riot => self.riot_game_id = title_id,
            Platform::Manual => {}
        }
    }

    pub fn playtime_hours(&self) -> f64 {
        self.playtime_minutes as f64 / 60.0
    }
}

impl fmt::Display for LibraryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LibraryEntry({}/{}): {} min",
            &self.user_id, &self.catalog_id, self.playtime_minutes
        )
    }
}

#[derive(Serialize, Deserialize, Valuable, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Wishlist,
    Playing,
    Completed,
    Dropped,
}

/// Manual curation applied to an entry. Only the fields that are set are
/// changed; blank notes clear the stored notes.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    #[serde(default)]
    pub status: Option<EntryStatus>,

    #[serde(default)]
    pub rating: Option<u8>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub reset_playtime: bool,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.rating.is_none()
            && self.notes.is_none()
            && !self.reset_playtime
    }
}

/// Read model of a library entry together with the platforms it is owned on.
/// Recomputed from storage on every read.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct CombinedLibraryEntry {
    pub entry: LibraryEntry,
    pub platforms: BTreeSet<Platform>,
}
