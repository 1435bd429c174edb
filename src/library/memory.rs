use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::Mutex;

use crate::{
    documents::{CanonicalGame, LibraryEntry},
    traits::{Catalog, LibraryStore, UsernameDirectory},
    Status,
};

/// In-process store with the same conditional-write semantics as the
/// Firestore store. Used for local runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<(String, u64), LibraryEntry>>,
    games: Mutex<HashMap<u64, CanonicalGame>>,
    usernames: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub async fn add_game(&self, game: CanonicalGame) {
        self.games.lock().await.insert(game.id, game);
    }

    pub async fn claim_username(&self, username: &str) {
        self.usernames.lock().await.insert(username.to_owned());
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn get_library_entries(&self, user_id: &str) -> Result<Vec<LibraryEntry>, Status> {
        Ok(self
            .entries
            .lock()
            .await
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_library_entry(
        &self,
        user_id: &str,
        catalog_id: u64,
    ) -> Result<Option<LibraryEntry>, Status> {
        Ok(self
            .entries
            .lock()
            .await
            .get(&(user_id.to_owned(), catalog_id))
            .cloned())
    }

    async fn upsert_library_entry(&self, entry: &LibraryEntry) -> Result<LibraryEntry, Status> {
        let mut entries = self.entries.lock().await;
        let key = (entry.user_id.clone(), entry.catalog_id);

        let stored_revision = entries.get(&key).map_or(0, |e| e.revision);
        if stored_revision != entry.revision {
            return Err(Status::conflict(format!(
                "'{}/{}' is at revision {stored_revision}, write expected {}",
                &entry.user_id, &entry.catalog_id, entry.revision
            )));
        }

        let mut next = entry.clone();
        next.revision += 1;
        entries.insert(key, next.clone());
        Ok(next)
    }

    async fn delete_library_entry(&self, user_id: &str, id: &str) -> Result<(), Status> {
        self.entries
            .lock()
            .await
            .retain(|(uid, _), e| uid != user_id || e.id != id);
        Ok(())
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn fetch_game_metadata(&self, catalog_id: u64) -> Result<CanonicalGame, Status> {
        match self.games.lock().await.get(&catalog_id) {
            Some(game) => Ok(game.clone()),
            None => Err(Status::not_found(format!(
                "Game '{catalog_id}' was not found"
            ))),
        }
    }
}

#[async_trait]
impl UsernameDirectory for MemoryStore {
    async fn is_taken(&self, username: &str) -> Result<bool, Status> {
        Ok(self.usernames.lock().await.contains(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn conditional_writes() {
        let store = MemoryStore::new();
        let entry = LibraryEntry::new("u", 100, 0);

        let stored = store.upsert_library_entry(&entry).await.unwrap();
        assert_eq!(stored.revision, 1);

        // Stale write of a new entry.
        assert!(matches!(
            store.upsert_library_entry(&entry).await,
            Err(Status::Conflict(_))
        ));

        let mut update = stored.clone();
        update.playtime_minutes = 10;
        let stored = store.upsert_library_entry(&update).await.unwrap();
        assert_eq!(stored.revision, 2);
        assert_eq!(
            store.get_library_entry("u", 100).await.unwrap().unwrap().playtime_minutes,
            10
        );
    }

    #[tokio::test]
    async fn entries_are_scoped_per_user() {
        let store = MemoryStore::new();
        store
            .upsert_library_entry(&LibraryEntry::new("a", 100, 0))
            .await
            .unwrap();
        store
            .upsert_library_entry(&LibraryEntry::new("b", 100, 0))
            .await
            .unwrap();

        assert_eq!(store.get_library_entries("a").await.unwrap().len(), 1);

        store.delete_library_entry("a", "100").await.unwrap();
        assert!(store.get_library_entries("a").await.unwrap().is_empty());
        assert_eq!(store.get_library_entries("b").await.unwrap().len(), 1);
    }
}
