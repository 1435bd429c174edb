use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap},
};

use crate::{
    documents::{CombinedLibraryEntry, EntryStatus, LibraryEntry, Platform, PlatformRecord},
    logging::SyncCounters,
};
use tracing::{instrument, warn};

pub struct Reconciler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Imported,
    Updated,
    Unchanged,
}

/// Result of merging one resolved `PlatformRecord` into a user's library.
#[derive(Debug, Clone)]
pub struct Merge {
    pub record: PlatformRecord,
    pub entry: LibraryEntry,
    pub classification: Classification,
}

impl Reconciler {
    /// Merges a batch of resolved records from one platform into the user's
    /// current entries.
    ///
    /// Returns one `Merge` per catalog id in the batch, ordered by catalog
    /// id. Entries owned by the platform but absent from the batch are not
    /// touched. Records without a catalog id are dropped.
    #[instrument(
        level = "trace",
        skip(existing, records),
        fields(
            existing_len = %existing.len(),
            records_len = %records.len(),
        ),
    )]
    pub fn reconcile(
        user_id: &str,
        existing: &[LibraryEntry],
        platform: Platform,
        records: Vec<PlatformRecord>,
        now: u64,
    ) -> Vec<Merge> {
        let existing = HashMap::<u64, &LibraryEntry>::from_iter(
            existing
                .iter()
                .filter(|e| e.user_id == user_id)
                .map(|e| (e.catalog_id, e)),
        );

        Self::dedup(platform, records)
            .into_iter()
            .map(|(catalog_id, record)| {
                let (entry, classification) = Self::merge(
                    user_id,
                    existing.get(&catalog_id).copied(),
                    platform,
                    catalog_id,
                    &record,
                    now,
                );
                Merge {
                    record,
                    entry,
                    classification,
                }
            })
            .collect()
    }

    /// Groups records by catalog id keeping one record per id.
    ///
    /// The record with the larger playtime wins. Ties keep the smaller
    /// platform title id so the outcome does not depend on fetch order.
    pub fn dedup(platform: Platform, records: Vec<PlatformRecord>) -> BTreeMap<u64, PlatformRecord> {
        let mut grouped = BTreeMap::<u64, PlatformRecord>::new();

        for record in records {
            let catalog_id = match record.catalog_id {
                Some(id) => id,
                None => {
                    warn!(
                        "Dropping unresolved {platform} record '{}'",
                        record.platform_title_id
                    );
                    continue;
                }
            };

            match grouped.get_mut(&catalog_id) {
                Some(kept) => {
                    let replace = match record.playtime_minutes.cmp(&kept.playtime_minutes) {
                        Ordering::Greater => true,
                        Ordering::Less => false,
                        Ordering::Equal => record.platform_title_id < kept.platform_title_id,
                    };
                    let discarded = match replace {
                        true => std::mem::replace(kept, record),
                        false => record,
                    };
                    SyncCounters::duplicate_record(
                        platform,
                        catalog_id,
                        &discarded.platform_title_id,
                    );
                }
                None => {
                    grouped.insert(catalog_id, record);
                }
            }
        }

        grouped
    }

    /// Merges a single record into the existing entry for its catalog id, or
    /// creates a new entry if there is none.
    ///
    /// Playtime never regresses, `source_platforms` only grows and ranked data
    /// is replaced when the record carries it. Timestamps are set to `now`
    /// only when something changed.
    pub fn merge(
        user_id: &str,
        existing: Option<&LibraryEntry>,
        platform: Platform,
        catalog_id: u64,
        record: &PlatformRecord,
        now: u64,
    ) -> (LibraryEntry, Classification) {
        match existing {
            None => {
                let mut entry = LibraryEntry::new(user_id, catalog_id, now);
                entry.status = match record.playtime_minutes > 0 {
                    true => Some(EntryStatus::Playing),
                    false => None,
                };
                entry.source_platforms = BTreeSet::from([platform]);
                entry.set_platform_title_id(platform, Some(record.platform_title_id.clone()));
                entry.playtime_minutes = record.playtime_minutes;
                entry.ranked_data = record.ranked_data.clone();
                entry.last_synced_at = Some(now);

                (entry, Classification::Imported)
            }
            Some(existing) => {
                let mut entry = existing.clone();
                entry.playtime_minutes = entry.playtime_minutes.max(record.playtime_minutes);
                entry.source_platforms.insert(platform);
                entry.set_platform_title_id(platform, Some(record.platform_title_id.clone()));
                if let Some(ranked_data) = &record.ranked_data {
                    entry.ranked_data = Some(ranked_data.clone());
                }
                if entry.playtime_minutes > 0
                    && matches!(entry.status, None | Some(EntryStatus::Wishlist))
                {
                    entry.status = Some(EntryStatus::Playing);
                }

                match entry == *existing {
                    true => (entry, Classification::Unchanged),
                    false => {
                        entry.last_synced_at = Some(now);
                        (entry, Classification::Updated)
                    }
                }
            }
        }
    }

    /// Builds the combined read model from stored entries.
    ///
    /// Storage keys entries by (user_id, catalog_id), but if duplicates are
    /// ever returned they are folded with the same rules a sync applies.
    pub fn combine(entries: Vec<LibraryEntry>) -> Vec<CombinedLibraryEntry> {
        let mut combined = BTreeMap::<(String, u64), LibraryEntry>::new();

        for entry in entries {
            match combined.get_mut(&(entry.user_id.clone(), entry.catalog_id)) {
                Some(kept) => absorb(kept, entry),
                None => {
                    combined.insert((entry.user_id.clone(), entry.catalog_id), entry);
                }
            }
        }

        combined
            .into_values()
            .map(|entry| CombinedLibraryEntry {
                platforms: entry.source_platforms.clone(),
                entry,
            })
            .collect()
    }
}

/// Folds a duplicate entry into `kept`.
fn absorb(kept: &mut LibraryEntry, other: LibraryEntry) {
    warn!("Folding duplicate entry {other}");

    kept.playtime_minutes = kept.playtime_minutes.max(other.playtime_minutes);
    kept.source_platforms.extend(other.source_platforms);
    kept.created_at = kept.created_at.min(other.created_at);
    kept.last_synced_at = kept.last_synced_at.max(other.last_synced_at);
    kept.steam_app_id = kept.steam_app_id.take().or(other.steam_app_id);
    kept.psn_title_id = kept.psn_title_id.take().or(other.psn_title_id);
    kept.riot_game_id = kept.riot_game_id.take().or(other.riot_game_id);
    kept.ranked_data = kept.ranked_data.take().or(other.ranked_data);
    kept.status = kept.status.or(other.status);
    kept.rating = kept.rating.or(other.rating);
    kept.notes = kept.notes.take().or(other.notes);
}
