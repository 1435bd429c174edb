use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use valuable::Valuable;

use crate::{
    documents::{Platform, SyncResult},
    log_event,
    logging::LogEvent,
    Status,
};

#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
pub struct SyncEvent {
    user_id: String,
    platform: Platform,
    fetched: usize,
    result: Option<SyncResult>,
    error: Option<String>,
}

impl SyncEvent {
    pub fn completed(user_id: &str, platform: Platform, fetched: usize, result: &SyncResult) {
        log_event!(LogEvent::Sync(SyncEvent {
            user_id: user_id.to_owned(),
            platform,
            fetched,
            result: Some(result.clone()),
            error: None,
        }));
    }

    pub fn aborted(user_id: &str, platform: Platform, status: &Status) {
        log_event!(LogEvent::Sync(SyncEvent {
            user_id: user_id.to_owned(),
            platform,
            fetched: 0,
            result: None,
            error: Some(status.to_string()),
        }));
    }
}
