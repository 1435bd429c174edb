use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use valuable::Valuable;

use crate::{documents::Platform, log_event, logging::LogEvent};

#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
pub enum PlatformEvent {
    FetchLibrary(FetchLibrary),
}

#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
pub struct FetchLibrary {
    platform: Platform,
    account: String,
    title_count: usize,
    error: Option<String>,
}

impl PlatformEvent {
    pub fn fetch_library(
        platform: Platform,
        account: &str,
        title_count: usize,
        error: Option<String>,
    ) {
        log_event!(LogEvent::Platform(PlatformEvent::FetchLibrary(
            FetchLibrary {
                platform,
                account: account.to_owned(),
                title_count,
                error,
            }
        )));
    }
}
