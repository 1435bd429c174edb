use crate::documents::{BadgeTier, EntryUpdate, Platform, SyncResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Sync {
    pub user_id: String,

    /// Syncs every linked platform if not set.
    #[serde(default)]
    pub platform: Option<Platform>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SyncResponse {
    pub results: Vec<PlatformSyncResult>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PlatformSyncResult {
    pub platform: Option<Platform>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SyncResult>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The platform credential expired and the account must be linked again.
    #[serde(default)]
    pub relink_required: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Library {
    pub user_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CanRate {
    pub user_id: String,
    pub catalog_id: u64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Badges {
    pub user_id: String,
    pub tiers: Vec<BadgeTier>,
}

/// Manual curation of a library entry. Only the fields that are set are
/// applied.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UpdateOp {
    pub user_id: String,
    pub catalog_id: u64,

    #[serde(flatten)]
    pub update: EntryUpdate,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Game {
    pub user_id: String,
    pub catalog_id: u64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct WishlistOp {
    pub user_id: String,
    pub catalog_id: u64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RemoveOp {
    pub user_id: String,
    pub catalog_id: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Unlink {
    pub user_id: String,
    pub platform: Platform,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UsernameCheck {
    pub username: String,
}
