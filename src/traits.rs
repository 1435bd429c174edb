use async_trait::async_trait;

use crate::{
    documents::{CanonicalGame, LibraryEntry, Platform, PlatformRecord},
    Status,
};

/// Remote platform that can list the titles owned by a linked account.
///
/// Implementations are pure fetchers: records come back in any order with
/// playtime in minutes, and no dedup or identity resolution is applied.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fails with `AuthExpired`, `Network`, `Timeout` or `RateLimited`.
    async fn fetch_library(&self) -> Result<Vec<PlatformRecord>, Status>;
}

/// Maps platform-native title ids to catalog ids.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns `None` when the title is not known to the catalog.
    async fn resolve(
        &self,
        platform_title_id: &str,
        platform: Platform,
    ) -> Result<Option<u64>, Status>;
}

/// Game metadata used for display only.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn fetch_game_metadata(&self, catalog_id: u64) -> Result<CanonicalGame, Status>;
}

/// Document store holding library entries keyed by (user_id, catalog_id).
#[async_trait]
pub trait LibraryStore: Send + Sync {
    async fn get_library_entries(&self, user_id: &str) -> Result<Vec<LibraryEntry>, Status>;

    async fn get_library_entry(
        &self,
        user_id: &str,
        catalog_id: u64,
    ) -> Result<Option<LibraryEntry>, Status>;

    /// Conditional write. Succeeds only if the stored revision equals
    /// `entry.revision` (zero for an entry that must not exist yet) and
    /// returns the stored entry with its revision bumped. Fails with
    /// `Status::Conflict` otherwise.
    async fn upsert_library_entry(&self, entry: &LibraryEntry) -> Result<LibraryEntry, Status>;

    async fn delete_library_entry(&self, user_id: &str, id: &str) -> Result<(), Status>;
}

/// Registry of claimed usernames.
#[async_trait]
pub trait UsernameDirectory: Send + Sync {
    async fn is_taken(&self, username: &str) -> Result<bool, Status>;
}
