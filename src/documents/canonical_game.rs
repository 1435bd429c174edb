use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::CombinedLibraryEntry;

/// Catalog game identity. `id` is the dedup key across all platforms.
///
/// Document type under 'games/{catalog_id}'.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct CanonicalGame {
    pub id: u64,
    pub name: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub genres: BTreeSet<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub platforms_tagged: BTreeSet<String>,
}

/// Catalog metadata of a game and the user's entry for it, if owned.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct GameDetails {
    pub game: CanonicalGame,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<CombinedLibraryEntry>,
}
