pub mod external_games;
pub mod games;
pub mod library_entries;
pub mod user_data;
pub mod usernames;
mod utils;

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    api::FirestoreApi,
    documents::{CanonicalGame, LibraryEntry},
    traits::{Catalog, LibraryStore, UsernameDirectory},
    Status,
};

/// Firestore-backed implementation of the storage, catalog and username
/// boundaries.
#[derive(Clone)]
pub struct FirestoreStore {
    firestore: Arc<FirestoreApi>,
}

impl FirestoreStore {
    pub fn new(firestore: Arc<FirestoreApi>) -> Self {
        FirestoreStore { firestore }
    }
}

#[async_trait]
impl LibraryStore for FirestoreStore {
    async fn get_library_entries(&self, user_id: &str) -> Result<Vec<LibraryEntry>, Status> {
        library_entries::list(&self.firestore, user_id).await
    }

    async fn get_library_entry(
        &self,
        user_id: &str,
        catalog_id: u64,
    ) -> Result<Option<LibraryEntry>, Status> {
        library_entries::read(&self.firestore, user_id, catalog_id).await
    }

    async fn upsert_library_entry(&self, entry: &LibraryEntry) -> Result<LibraryEntry, Status> {
        library_entries::upsert(&self.firestore, entry).await
    }

    async fn delete_library_entry(&self, user_id: &str, id: &str) -> Result<(), Status> {
        library_entries::delete(&self.firestore, user_id, id).await
    }
}

#[async_trait]
impl Catalog for FirestoreStore {
    async fn fetch_game_metadata(&self, catalog_id: u64) -> Result<CanonicalGame, Status> {
        games::read(&self.firestore, catalog_id).await
    }
}

#[async_trait]
impl UsernameDirectory for FirestoreStore {
    async fn is_taken(&self, username: &str) -> Result<bool, Status> {
        usernames::exists(&self.firestore, username).await
    }
}
