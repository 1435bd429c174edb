use crate::{documents::Platform, Status};

use super::counters::*;

pub struct SyncCounters;

impl SyncCounters {
    pub fn unresolved(platform: Platform, platform_title_id: &str) {
        counter(
            "sync_unresolved",
            &format!("Unresolved {platform} title: '{platform_title_id}'"),
        )
    }

    pub fn resolve_fail(platform: Platform, platform_title_id: &str, status: &Status) {
        error_counter(
            "sync_resolve_fail",
            &format!("Resolve failed for {platform} title: '{platform_title_id}'"),
            status,
        )
    }

    pub fn duplicate_record(platform: Platform, catalog_id: u64, discarded: &str) {
        counter(
            "sync_duplicate_record",
            &format!(
                "Duplicate {platform} record for catalog {catalog_id}, discarded '{discarded}'"
            ),
        )
    }

    pub fn write_conflict(user_id: &str, catalog_id: u64) {
        counter(
            "sync_write_conflict",
            &format!("Write conflict on '{user_id}/{catalog_id}'"),
        )
    }

    pub fn persist_fail(user_id: &str, catalog_id: u64, status: &Status) {
        error_counter(
            "sync_persist_fail",
            &format!("Persist failed for '{user_id}/{catalog_id}'"),
            status,
        )
    }
}
