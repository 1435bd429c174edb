use std::{sync::Arc, time::Duration};

use futures::{stream, StreamExt};
use tracing::{info, instrument, warn};

use crate::{
    api,
    documents::{Platform, PlatformRecord, SyncResult},
    games::{Classification, Merge, Reconciler},
    logging::{SyncCounters, SyncEvent},
    traits::{IdentityResolver, LibraryStore, PlatformAdapter},
    Status,
};

use super::MAX_WRITE_ATTEMPTS;

/// Drives a full library sync for one platform: fetch, resolve, reconcile
/// against stored entries and persist what changed.
pub struct LibrarySync {
    store: Arc<dyn LibraryStore>,
    resolver: Arc<dyn IdentityResolver>,
    timeout: Duration,
}

const MAX_IN_FLIGHT: usize = 16;

impl LibrarySync {
    pub fn new(
        store: Arc<dyn LibraryStore>,
        resolver: Arc<dyn IdentityResolver>,
        timeout: Duration,
    ) -> Self {
        LibrarySync {
            store,
            resolver,
            timeout,
        }
    }

    /// Syncs the library of `user_id` with the remote platform behind
    /// `adapter`.
    ///
    /// Adapter failures (including the fetch timeout) abort the sync before
    /// anything is written. Per-title failures, either unresolved identities
    /// or failed writes, are counted in `SyncResult::failed` and the sync
    /// carries on with the remaining titles.
    #[instrument(
        name = "library::sync_full_library",
        level = "trace",
        skip(self, adapter),
        fields(platform = %adapter.platform()),
    )]
    pub async fn sync_full_library(
        &self,
        user_id: &str,
        adapter: &dyn PlatformAdapter,
    ) -> Result<SyncResult, Status> {
        let platform = adapter.platform();

        let records = match tokio::time::timeout(self.timeout, adapter.fetch_library()).await {
            Ok(Ok(records)) => records,
            Ok(Err(status)) => {
                SyncEvent::aborted(user_id, platform, &status);
                return Err(status);
            }
            Err(elapsed) => {
                let status = Status::from(elapsed);
                SyncEvent::aborted(user_id, platform, &status);
                return Err(status);
            }
        };
        let fetched = records.len();

        let mut result = SyncResult::default();
        let records = self.resolve(platform, records, &mut result).await;

        let existing = match self.store.get_library_entries(user_id).await {
            Ok(entries) => entries,
            Err(status) => {
                SyncEvent::aborted(user_id, platform, &status);
                return Err(status);
            }
        };

        let now = api::now();
        let merges = Reconciler::reconcile(user_id, &existing, platform, records, now);

        let outcomes = stream::iter(merges.into_iter().map(|merge| async move {
            let catalog_id = merge.entry.catalog_id;
            (
                catalog_id,
                self.persist(user_id, platform, merge, now).await,
            )
        }))
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect::<Vec<_>>()
        .await;

        for (catalog_id, outcome) in outcomes {
            match outcome {
                Ok(Classification::Imported) => result.imported += 1,
                Ok(Classification::Updated) => result.updated += 1,
                Ok(Classification::Unchanged) => result.unchanged += 1,
                Err(status) => {
                    SyncCounters::persist_fail(user_id, catalog_id, &status);
                    result.fail(format!("failed to persist catalog id {catalog_id}: {status}"));
                }
            }
        }

        info!(
            "Synced {fetched} {platform} titles for '{user_id}': {} imported, {} updated, {} unchanged, {} failed",
            result.imported, result.updated, result.unchanged, result.failed
        );
        SyncEvent::completed(user_id, platform, fetched, &result);
        Ok(result)
    }

    /// Resolves catalog ids of `records`. Records that cannot be resolved are
    /// dropped and accounted as failures in `result`.
    async fn resolve(
        &self,
        platform: Platform,
        records: Vec<PlatformRecord>,
        result: &mut SyncResult,
    ) -> Vec<PlatformRecord> {
        let resolved = stream::iter(records.into_iter().map(|record| async move {
            let response = self
                .resolver
                .resolve(&record.platform_title_id, platform)
                .await;
            (record, response)
        }))
        .buffered(MAX_IN_FLIGHT)
        .collect::<Vec<_>>()
        .await;

        let mut records = vec![];
        for (mut record, response) in resolved {
            match response {
                Ok(Some(catalog_id)) => {
                    record.catalog_id = Some(catalog_id);
                    records.push(record);
                }
                Ok(None) => {
                    warn!(
                        "Dropping unresolved {platform} title '{}' ({})",
                        &record.platform_title_id, &record.title
                    );
                    SyncCounters::unresolved(platform, &record.platform_title_id);
                    result.fail(format!(
                        "unresolved {platform} title '{}'",
                        &record.platform_title_id
                    ));
                }
                Err(status) => {
                    SyncCounters::resolve_fail(platform, &record.platform_title_id, &status);
                    result.fail(format!(
                        "unresolved {platform} title '{}': {status}",
                        &record.platform_title_id
                    ));
                }
            }
        }
        records
    }

    /// Writes a merged entry. On a write conflict the entry is re-read and
    /// the record merged again against the stored value, so the persisted
    /// playtime is never computed from a stale read.
    ///
    /// Returns the classification of what was actually written.
    async fn persist(
        &self,
        user_id: &str,
        platform: Platform,
        merge: Merge,
        now: u64,
    ) -> Result<Classification, Status> {
        let Merge {
            record,
            mut entry,
            mut classification,
        } = merge;

        let mut attempts = 0;
        loop {
            // Also covers a re-merge after the last conflict that found
            // nothing left to write.
            if classification == Classification::Unchanged {
                return Ok(classification);
            }
            if attempts == MAX_WRITE_ATTEMPTS {
                break;
            }
            attempts += 1;

            match self.store.upsert_library_entry(&entry).await {
                Ok(_) => return Ok(classification),
                Err(Status::Conflict(_)) => {
                    SyncCounters::write_conflict(user_id, entry.catalog_id);
                    let stored = self
                        .store
                        .get_library_entry(user_id, entry.catalog_id)
                        .await?;
                    (entry, classification) = Reconciler::merge(
                        user_id,
                        stored.as_ref(),
                        platform,
                        entry.catalog_id,
                        &record,
                        now,
                    );
                }
                Err(status) => return Err(status),
            }
        }

        Err(Status::conflict(format!(
            "'{user_id}/{}' kept changing after {MAX_WRITE_ATTEMPTS} attempts",
            entry.catalog_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        documents::{EntryStatus, LibraryEntry},
        games::LookupTableResolver,
        library::MemoryStore,
    };
    use async_trait::async_trait;
    use std::{
        collections::{BTreeSet, HashSet},
        sync::atomic::{AtomicUsize, Ordering},
    };
    use tokio::sync::Mutex;

    struct FakeAdapter {
        platform: Platform,
        response: Result<Vec<PlatformRecord>, Status>,
        delay: Duration,
    }

    impl FakeAdapter {
        fn new(platform: Platform, records: Vec<(&str, u64)>) -> Self {
            FakeAdapter {
                platform,
                response: Ok(records
                    .into_iter()
                    .map(|(id, playtime_minutes)| PlatformRecord {
                        platform_title_id: id.to_owned(),
                        playtime_minutes,
                        ..Default::default()
                    })
                    .collect()),
                delay: Duration::ZERO,
            }
        }

        fn failing(platform: Platform, status: Status) -> Self {
            FakeAdapter {
                platform,
                response: Err(status),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl PlatformAdapter for FakeAdapter {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn fetch_library(&self) -> Result<Vec<PlatformRecord>, Status> {
            tokio::time::sleep(self.delay).await;
            self.response.clone()
        }
    }

    /// Fails writes for the listed catalog ids.
    struct FailingStore {
        inner: MemoryStore,
        failing: HashSet<u64>,
    }

    #[async_trait]
    impl LibraryStore for FailingStore {
        async fn get_library_entries(&self, user_id: &str) -> Result<Vec<LibraryEntry>, Status> {
            self.inner.get_library_entries(user_id).await
        }

        async fn get_library_entry(
            &self,
            user_id: &str,
            catalog_id: u64,
        ) -> Result<Option<LibraryEntry>, Status> {
            self.inner.get_library_entry(user_id, catalog_id).await
        }

        async fn upsert_library_entry(&self, entry: &LibraryEntry) -> Result<LibraryEntry, Status> {
            match self.failing.contains(&entry.catalog_id) {
                true => Err(Status::internal("disk full")),
                false => self.inner.upsert_library_entry(entry).await,
            }
        }

        async fn delete_library_entry(&self, user_id: &str, id: &str) -> Result<(), Status> {
            self.inner.delete_library_entry(user_id, id).await
        }
    }

    /// Lets a queued concurrent writer land before each upsert.
    struct RacingStore {
        inner: MemoryStore,
        concurrent: Mutex<Vec<LibraryEntry>>,
        upserts: AtomicUsize,
    }

    #[async_trait]
    impl LibraryStore for RacingStore {
        async fn get_library_entries(&self, user_id: &str) -> Result<Vec<LibraryEntry>, Status> {
            self.inner.get_library_entries(user_id).await
        }

        async fn get_library_entry(
            &self,
            user_id: &str,
            catalog_id: u64,
        ) -> Result<Option<LibraryEntry>, Status> {
            self.inner.get_library_entry(user_id, catalog_id).await
        }

        async fn upsert_library_entry(&self, entry: &LibraryEntry) -> Result<LibraryEntry, Status> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            if let Some(concurrent) = self.concurrent.lock().await.pop() {
                self.inner.upsert_library_entry(&concurrent).await?;
            }
            self.inner.upsert_library_entry(entry).await
        }

        async fn delete_library_entry(&self, user_id: &str, id: &str) -> Result<(), Status> {
            self.inner.delete_library_entry(user_id, id).await
        }
    }

    fn resolver() -> Arc<LookupTableResolver> {
        Arc::new(
            LookupTableResolver::new()
                .with(Platform::Steam, "620", 100)
                .with(Platform::Steam, "400", 200)
                .with(Platform::PlayStation, "PPSA01284_00", 100)
                .with(Platform::PlayStation, "CUSA00001_00", 300),
        )
    }

    fn library_sync(store: Arc<dyn LibraryStore>) -> LibrarySync {
        LibrarySync::new(store, resolver(), Duration::from_secs(30))
    }

    async fn entry(store: &MemoryStore, catalog_id: u64) -> LibraryEntry {
        store
            .get_library_entry("alice", catalog_id)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn first_steam_sync_imports() {
        let store = Arc::new(MemoryStore::new());
        let sync = library_sync(store.clone());

        let result = sync
            .sync_full_library("alice", &FakeAdapter::new(Platform::Steam, vec![("620", 120)]))
            .await
            .unwrap();

        assert_eq!(
            result,
            SyncResult {
                imported: 1,
                ..Default::default()
            }
        );

        let entries = store.get_library_entries("alice").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].catalog_id, 100);
        assert_eq!(entries[0].playtime_minutes, 120);
        assert_eq!(entries[0].source_platforms, BTreeSet::from([Platform::Steam]));
        assert_eq!(entries[0].steam_app_id.as_deref(), Some("620"));
        assert_eq!(entries[0].status, Some(EntryStatus::Playing));
    }

    #[tokio::test]
    async fn cross_platform_title_merges_into_one_entry() {
        let store = Arc::new(MemoryStore::new());
        let sync = library_sync(store.clone());

        sync.sync_full_library("alice", &FakeAdapter::new(Platform::Steam, vec![("620", 120)]))
            .await
            .unwrap();
        let result = sync
            .sync_full_library(
                "alice",
                &FakeAdapter::new(Platform::PlayStation, vec![("PPSA01284_00", 80)]),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            SyncResult {
                updated: 1,
                ..Default::default()
            }
        );

        let entries = store.get_library_entries("alice").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].playtime_minutes, 120);
        assert_eq!(
            entries[0].source_platforms,
            BTreeSet::from([Platform::Steam, Platform::PlayStation])
        );
        assert_eq!(entries[0].psn_title_id.as_deref(), Some("PPSA01284_00"));
    }

    #[tokio::test]
    async fn resync_without_remote_change_is_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let sync = library_sync(store.clone());
        let adapter = FakeAdapter::new(Platform::Steam, vec![("620", 120), ("400", 0)]);

        let first = sync.sync_full_library("alice", &adapter).await.unwrap();
        assert_eq!(first.imported, 2);
        let revision = entry(&store, 100).await.revision;

        let second = sync.sync_full_library("alice", &adapter).await.unwrap();
        assert_eq!(
            second,
            SyncResult {
                unchanged: 2,
                ..Default::default()
            }
        );
        // Unchanged entries are not rewritten.
        assert_eq!(entry(&store, 100).await.revision, revision);
    }

    #[tokio::test]
    async fn sync_order_does_not_matter() {
        let steam = FakeAdapter::new(Platform::Steam, vec![("620", 30), ("400", 10)]);
        let psn = FakeAdapter::new(
            Platform::PlayStation,
            vec![("PPSA01284_00", 90), ("CUSA00001_00", 0)],
        );

        let a = Arc::new(MemoryStore::new());
        library_sync(a.clone())
            .sync_full_library("alice", &steam)
            .await
            .unwrap();
        library_sync(a.clone())
            .sync_full_library("alice", &psn)
            .await
            .unwrap();

        let b = Arc::new(MemoryStore::new());
        library_sync(b.clone())
            .sync_full_library("alice", &psn)
            .await
            .unwrap();
        library_sync(b.clone())
            .sync_full_library("alice", &steam)
            .await
            .unwrap();

        let strip = |entries: Vec<LibraryEntry>| {
            entries
                .into_iter()
                .map(|e| {
                    (
                        e.catalog_id,
                        e.playtime_minutes,
                        e.source_platforms,
                        e.status,
                        e.steam_app_id,
                        e.psn_title_id,
                    )
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(
            strip(a.get_library_entries("alice").await.unwrap()),
            strip(b.get_library_entries("alice").await.unwrap())
        );
    }

    #[tokio::test]
    async fn unresolved_titles_are_counted_and_dropped() {
        let store = Arc::new(MemoryStore::new());
        let sync = library_sync(store.clone());

        let result = sync
            .sync_full_library(
                "alice",
                &FakeAdapter::new(Platform::Steam, vec![("620", 120), ("999", 60)]),
            )
            .await
            .unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors, vec!["unresolved steam title '999'".to_owned()]);
        assert_eq!(store.get_library_entries("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn absent_titles_are_left_untouched() {
        let store = Arc::new(MemoryStore::new());
        let sync = library_sync(store.clone());

        sync.sync_full_library(
            "alice",
            &FakeAdapter::new(Platform::Steam, vec![("620", 120), ("400", 10)]),
        )
        .await
        .unwrap();
        let result = sync
            .sync_full_library("alice", &FakeAdapter::new(Platform::Steam, vec![("620", 150)]))
            .await
            .unwrap();

        assert_eq!(result.updated, 1);
        assert_eq!(result.total(), 1);
        let dropped_out = entry(&store, 200).await;
        assert_eq!(dropped_out.playtime_minutes, 10);
        assert_eq!(dropped_out.source_platforms, BTreeSet::from([Platform::Steam]));
    }

    #[tokio::test]
    async fn playtime_never_regresses() {
        let store = Arc::new(MemoryStore::new());
        let sync = library_sync(store.clone());

        sync.sync_full_library("alice", &FakeAdapter::new(Platform::Steam, vec![("620", 120)]))
            .await
            .unwrap();
        let result = sync
            .sync_full_library("alice", &FakeAdapter::new(Platform::Steam, vec![("620", 60)]))
            .await
            .unwrap();

        assert_eq!(result.unchanged, 1);
        assert_eq!(entry(&store, 100).await.playtime_minutes, 120);
    }

    #[tokio::test]
    async fn auth_expired_aborts_sync() {
        let store = Arc::new(MemoryStore::new());
        let sync = library_sync(store.clone());

        let result = sync
            .sync_full_library(
                "alice",
                &FakeAdapter::failing(Platform::Steam, Status::auth_expired("401")),
            )
            .await;

        assert!(matches!(result, Err(Status::AuthExpired(_))));
        assert!(store.get_library_entries("alice").await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_adapter_times_out() {
        let store = Arc::new(MemoryStore::new());
        let sync = LibrarySync::new(store.clone(), resolver(), Duration::from_secs(5));

        let mut adapter = FakeAdapter::new(Platform::Steam, vec![("620", 120)]);
        adapter.delay = Duration::from_secs(60);

        let result = sync.sync_full_library("alice", &adapter).await;

        assert!(matches!(result, Err(Status::Timeout(_))));
        assert!(store.get_library_entries("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persist_failure_is_reported_per_entry() {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing: HashSet::from([200]),
        });
        let sync = library_sync(store.clone());

        let result = sync
            .sync_full_library(
                "alice",
                &FakeAdapter::new(Platform::Steam, vec![("620", 120), ("400", 10)]),
            )
            .await
            .unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.failed, 1);
        assert!(result.errors[0].contains("200"));

        let entries = store.get_library_entries("alice").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].catalog_id, 100);
    }

    #[tokio::test]
    async fn conflicting_write_remerges_fresh_value() {
        // A concurrent PlayStation sync stores the entry between our read
        // and our write.
        let mut concurrent = LibraryEntry::new("alice", 100, 0);
        concurrent.playtime_minutes = 300;
        concurrent.source_platforms = BTreeSet::from([Platform::PlayStation]);
        concurrent.psn_title_id = Some("PPSA01284_00".to_owned());
        concurrent.status = Some(EntryStatus::Completed);

        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            concurrent: Mutex::new(vec![concurrent]),
            upserts: AtomicUsize::new(0),
        });
        let sync = library_sync(store.clone());

        let result = sync
            .sync_full_library("alice", &FakeAdapter::new(Platform::Steam, vec![("620", 120)]))
            .await
            .unwrap();

        // The entry existed by the time the write landed.
        assert_eq!(
            result,
            SyncResult {
                updated: 1,
                ..Default::default()
            }
        );
        assert_eq!(store.upserts.load(Ordering::SeqCst), 2);

        let entry = entry(&store.inner, 100).await;
        assert_eq!(entry.playtime_minutes, 300);
        assert_eq!(entry.status, Some(EntryStatus::Completed));
        assert_eq!(
            entry.source_platforms,
            BTreeSet::from([Platform::Steam, Platform::PlayStation])
        );
        assert_eq!(entry.revision, 2);
    }

    #[tokio::test]
    async fn last_conflict_with_nothing_left_to_write_is_unchanged() {
        // Every write races with a concurrent PlayStation sync. The last one
        // already stored everything this Steam sync brings.
        let mut concurrent = (0..MAX_WRITE_ATTEMPTS as u64)
            .map(|revision| {
                let mut entry = LibraryEntry::new("alice", 100, 0);
                entry.revision = revision;
                entry.playtime_minutes = 200 + revision;
                entry.status = Some(EntryStatus::Playing);
                entry.source_platforms = BTreeSet::from([Platform::PlayStation]);
                entry.psn_title_id = Some("PPSA01284_00".to_owned());
                entry
            })
            .collect::<Vec<_>>();
        if let Some(last) = concurrent.last_mut() {
            last.source_platforms.insert(Platform::Steam);
            last.steam_app_id = Some("620".to_owned());
        }
        concurrent.reverse();

        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            concurrent: Mutex::new(concurrent),
            upserts: AtomicUsize::new(0),
        });
        let sync = library_sync(store.clone());

        let result = sync
            .sync_full_library("alice", &FakeAdapter::new(Platform::Steam, vec![("620", 120)]))
            .await
            .unwrap();

        assert_eq!(
            result,
            SyncResult {
                unchanged: 1,
                ..Default::default()
            }
        );
        assert_eq!(store.upserts.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);

        let entry = entry(&store.inner, 100).await;
        assert_eq!(entry.playtime_minutes, 204);
        assert_eq!(entry.revision, MAX_WRITE_ATTEMPTS as u64);
    }

    #[tokio::test]
    async fn riot_single_title() {
        let store = Arc::new(MemoryStore::new());
        let sync = LibrarySync::new(
            store.clone(),
            Arc::new(crate::games::FixedTitleResolver::new(7)),
            Duration::from_secs(30),
        );

        let mut adapter = FakeAdapter::new(Platform::Riot, vec![("valorant", 95)]);
        if let Ok(records) = &mut adapter.response {
            records[0].ranked_data = Some(serde_json::json!({"competitiveTier": 12}));
        }

        let result = sync.sync_full_library("alice", &adapter).await.unwrap();

        assert_eq!(result.imported, 1);
        let entry = entry(&store, 7).await;
        assert_eq!(entry.riot_game_id.as_deref(), Some("valorant"));
        assert_eq!(
            entry.ranked_data,
            Some(serde_json::json!({"competitiveTier": 12}))
        );
    }
}
