use std::{collections::BTreeSet, sync::Arc};

use tracing::instrument;

use crate::{
    api,
    documents::{
        BadgeProgress, BadgeTier, CombinedLibraryEntry, EntryStatus, EntryUpdate, GameDetails,
        LibraryEntry, Platform, RateEligibility,
    },
    games::{eligibility, Reconciler},
    logging::SyncCounters,
    traits::{Catalog, LibraryStore},
    Status,
};

use super::MAX_WRITE_ATTEMPTS;

/// Read model and manual curation of a single user's library.
pub struct LibraryManager {
    user_id: String,
    store: Arc<dyn LibraryStore>,
}

impl LibraryManager {
    /// Creates a LibraryManager instance for a user.
    pub fn new(user_id: &str, store: Arc<dyn LibraryStore>) -> Self {
        LibraryManager {
            user_id: String::from(user_id),
            store,
        }
    }

    /// Returns the user's library with the platforms owning each entry,
    /// ordered by catalog id. Always reads from storage.
    #[instrument(name = "manager::get_combined_library", level = "trace", skip(self))]
    pub async fn get_combined_library(&self) -> Result<Vec<CombinedLibraryEntry>, Status> {
        let entries = self.store.get_library_entries(&self.user_id).await?;
        Ok(Reconciler::combine(entries))
    }

    #[instrument(name = "manager::can_rate", level = "trace", skip(self))]
    pub async fn can_rate(&self, catalog_id: u64) -> Result<RateEligibility, Status> {
        let library = self.get_combined_library().await?;
        Ok(eligibility::can_rate(&library, catalog_id))
    }

    #[instrument(name = "manager::badge_progress", level = "trace", skip(self, tiers))]
    pub async fn badge_progress(&self, tiers: &[BadgeTier]) -> Result<BadgeProgress, Status> {
        let library = self.get_combined_library().await?;
        Ok(eligibility::badge_progress(
            tiers,
            eligibility::completed_games(&library),
        ))
    }

    /// Display data of a game from `catalog`, with the user's entry when the
    /// game is in the library.
    #[instrument(name = "manager::game_details", level = "trace", skip(self, catalog))]
    pub async fn game_details(
        &self,
        catalog: &dyn Catalog,
        catalog_id: u64,
    ) -> Result<GameDetails, Status> {
        let game = catalog.fetch_game_metadata(catalog_id).await?;
        let entry = self
            .store
            .get_library_entry(&self.user_id, catalog_id)
            .await?;

        Ok(GameDetails {
            game,
            entry: Reconciler::combine(entry.into_iter().collect()).pop(),
        })
    }

    #[instrument(name = "manager::set_status", level = "trace", skip(self))]
    pub async fn set_status(
        &self,
        catalog_id: u64,
        status: Option<EntryStatus>,
    ) -> Result<LibraryEntry, Status> {
        self.modify(catalog_id, |entry| {
            entry.status = status;
            Ok(())
        })
        .await
    }

    /// Rates a game in 1..=10. Only games with enough playtime can be rated.
    #[instrument(name = "manager::rate_game", level = "trace", skip(self))]
    pub async fn rate_game(&self, catalog_id: u64, rating: u8) -> Result<LibraryEntry, Status> {
        self.update_entry(
            catalog_id,
            EntryUpdate {
                rating: Some(rating),
                ..Default::default()
            },
        )
        .await
    }

    /// Applies every field set in `update` in a single write. All checks run
    /// against the stored entry before anything is changed, so a rejected
    /// update leaves the entry untouched.
    #[instrument(name = "manager::update_entry", level = "trace", skip(self))]
    pub async fn update_entry(
        &self,
        catalog_id: u64,
        update: EntryUpdate,
    ) -> Result<LibraryEntry, Status> {
        if update.is_empty() {
            return Err(Status::invalid_argument(
                "Missing any of status, rating, notes or reset_playtime arguments.",
            ));
        }
        if let Some(rating) = update.rating {
            if !(1..=10).contains(&rating) {
                return Err(Status::invalid_argument(format!(
                    "Rating must be between 1 and 10, got {rating}."
                )));
            }
        }
        let notes = update
            .notes
            .as_ref()
            .map(|notes| Some(notes.clone()).filter(|notes| !notes.trim().is_empty()));

        self.modify(catalog_id, |entry| {
            if update.rating.is_some() {
                let eligibility =
                    eligibility::can_rate(&Reconciler::combine(vec![entry.clone()]), catalog_id);
                if !eligibility.can_rate {
                    return Err(Status::invalid_argument(
                        eligibility.reason.unwrap_or_default(),
                    ));
                }
            }

            if let Some(status) = update.status {
                entry.status = Some(status);
            }
            if update.reset_playtime {
                entry.playtime_minutes = 0;
            }
            if let Some(rating) = update.rating {
                entry.rating = Some(rating);
            }
            if let Some(notes) = &notes {
                entry.notes = notes.clone();
            }
            Ok(())
        })
        .await
    }

    #[instrument(name = "manager::set_notes", level = "trace", skip(self, notes))]
    pub async fn set_notes(
        &self,
        catalog_id: u64,
        notes: Option<String>,
    ) -> Result<LibraryEntry, Status> {
        let notes = notes.filter(|notes| !notes.trim().is_empty());
        self.modify(catalog_id, |entry| {
            entry.notes = notes.clone();
            Ok(())
        })
        .await
    }

    /// Adds a game the user does not own yet as a manual wishlist entry.
    #[instrument(name = "manager::add_to_wishlist", level = "trace", skip(self))]
    pub async fn add_to_wishlist(&self, catalog_id: u64) -> Result<LibraryEntry, Status> {
        if self
            .store
            .get_library_entry(&self.user_id, catalog_id)
            .await?
            .is_some()
        {
            return Err(Status::invalid_argument(format!(
                "Game '{catalog_id}' is already in the library."
            )));
        }

        let mut entry = LibraryEntry::new(&self.user_id, catalog_id, api::now());
        entry.status = Some(EntryStatus::Wishlist);
        entry.source_platforms = BTreeSet::from([Platform::Manual]);

        match self.store.upsert_library_entry(&entry).await {
            Ok(entry) => Ok(entry),
            Err(Status::Conflict(_)) => Err(Status::invalid_argument(format!(
                "Game '{catalog_id}' is already in the library."
            ))),
            Err(status) => Err(status),
        }
    }

    /// Deletes an entry. This is the only path that removes entries.
    #[instrument(name = "manager::remove_entry", level = "trace", skip(self))]
    pub async fn remove_entry(&self, catalog_id: u64) -> Result<(), Status> {
        match self.store.get_library_entry(&self.user_id, catalog_id).await? {
            Some(entry) => {
                self.store
                    .delete_library_entry(&self.user_id, &entry.id)
                    .await
            }
            None => Err(Status::not_found(format!(
                "Game '{catalog_id}' is not in the library."
            ))),
        }
    }

    /// Removes `platform` from every entry it contributed to and clears its
    /// title id. Entries are kept even if no platform remains.
    ///
    /// Returns the number of entries modified.
    #[instrument(name = "manager::unlink_platform", level = "trace", skip(self))]
    pub async fn unlink_platform(&self, platform: Platform) -> Result<usize, Status> {
        if platform == Platform::Manual {
            return Err(Status::invalid_argument(
                "The manual platform cannot be unlinked.",
            ));
        }

        let linked = self
            .store
            .get_library_entries(&self.user_id)
            .await?
            .into_iter()
            .filter(|e| e.source_platforms.contains(&platform))
            .map(|e| e.catalog_id)
            .collect::<Vec<_>>();

        for catalog_id in &linked {
            self.modify(*catalog_id, |entry| {
                entry.source_platforms.remove(&platform);
                entry.set_platform_title_id(platform, None);
                Ok(())
            })
            .await?;
        }
        Ok(linked.len())
    }

    /// Explicit reset, the only way playtime decreases.
    #[instrument(name = "manager::reset_playtime", level = "trace", skip(self))]
    pub async fn reset_playtime(&self, catalog_id: u64) -> Result<LibraryEntry, Status> {
        self.modify(catalog_id, |entry| {
            entry.playtime_minutes = 0;
            Ok(())
        })
        .await
    }

    /// Read-modify-write of a single entry, retried on write conflicts.
    async fn modify<F>(&self, catalog_id: u64, update: F) -> Result<LibraryEntry, Status>
    where
        F: Fn(&mut LibraryEntry) -> Result<(), Status>,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let stored = match self.store.get_library_entry(&self.user_id, catalog_id).await? {
                Some(entry) => entry,
                None => {
                    return Err(Status::not_found(format!(
                        "Game '{catalog_id}' is not in the library."
                    )))
                }
            };

            let mut entry = stored.clone();
            update(&mut entry)?;
            if entry == stored {
                return Ok(stored);
            }

            match self.store.upsert_library_entry(&entry).await {
                Ok(entry) => return Ok(entry),
                Err(Status::Conflict(_)) => {
                    SyncCounters::write_conflict(&self.user_id, catalog_id)
                }
                Err(status) => return Err(status),
            }
        }

        Err(Status::conflict(format!(
            "'{}/{catalog_id}' kept changing after {MAX_WRITE_ATTEMPTS} attempts",
            &self.user_id
        )))
    }
}
