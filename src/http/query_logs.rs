use std::time::SystemTime;

use tracing::{error, info};

use crate::{
    documents::Platform,
    validation::UsernameAvailability,
    Status,
};

use super::models;

pub struct SyncQuery {
    request: models::Sync,
    start: SystemTime,
}

impl SyncQuery {
    pub fn new(request: &models::Sync) -> Self {
        SyncQuery {
            request: request.clone(),
            start: SystemTime::now(),
        }
    }

    pub fn log(self, response: &models::SyncResponse) {
        let imported: usize = response
            .results
            .iter()
            .filter_map(|r| r.result.as_ref())
            .map(|r| r.imported)
            .sum();
        let updated: usize = response
            .results
            .iter()
            .filter_map(|r| r.result.as_ref())
            .map(|r| r.updated)
            .sum();
        let failed_platforms = response.results.iter().filter(|r| r.error.is_some()).count();

        info!(
            http_request.request_method = "POST",
            http_request.request_url = "/library/sync",
            http_request.latency = latency(self.start),
            labels.log_type = QUERY_LOGS,
            labels.handler = "sync",
            labels.user_id = self.request.user_id,
            request.platform = platform_label(self.request.platform),
            response.imported = imported,
            response.updated = updated,
            response.failed_platforms = failed_platforms,
            "sync '{}'",
            self.request.user_id
        )
    }

    pub fn log_error(self, status: &Status) {
        error!(
            http_request.request_method = "POST",
            http_request.request_url = "/library/sync",
            http_request.latency = latency(self.start),
            labels.log_type = QUERY_LOGS,
            labels.handler = "sync",
            labels.user_id = self.request.user_id,
            labels.status = status.to_string(),
            request.platform = platform_label(self.request.platform),
            "sync '{}'",
            self.request.user_id
        )
    }
}

/// Query log of the per-user library handlers.
pub struct LibraryQuery {
    handler: &'static str,
    user_id: String,
    start: SystemTime,
}

impl LibraryQuery {
    pub fn new(handler: &'static str, user_id: &str) -> Self {
        LibraryQuery {
            handler,
            user_id: user_id.to_owned(),
            start: SystemTime::now(),
        }
    }

    pub fn log(self) {
        info!(
            http_request.request_method = "POST",
            http_request.request_url = format!("/library/{}", self.handler),
            http_request.latency = latency(self.start),
            labels.log_type = QUERY_LOGS,
            labels.handler = self.handler,
            labels.user_id = self.user_id,
            "{} '{}'",
            self.handler,
            self.user_id
        )
    }

    pub fn log_error(self, status: &Status) {
        error!(
            http_request.request_method = "POST",
            http_request.request_url = format!("/library/{}", self.handler),
            http_request.latency = latency(self.start),
            labels.log_type = QUERY_LOGS,
            labels.handler = self.handler,
            labels.user_id = self.user_id,
            labels.status = status.to_string(),
            "{} '{}'",
            self.handler,
            self.user_id
        )
    }
}

pub struct UsernameQuery {
    start: SystemTime,
}

impl UsernameQuery {
    pub fn new() -> Self {
        UsernameQuery {
            start: SystemTime::now(),
        }
    }

    pub fn log(self, outcome: &UsernameAvailability) {
        info!(
            http_request.request_method = "POST",
            http_request.request_url = "/username/check",
            http_request.latency = latency(self.start),
            labels.log_type = QUERY_LOGS,
            labels.handler = "username_check",
            response.outcome = format!("{outcome:?}"),
            "username check"
        )
    }

    pub fn log_error(self, status: &Status) {
        error!(
            http_request.request_method = "POST",
            http_request.request_url = "/username/check",
            http_request.latency = latency(self.start),
            labels.log_type = QUERY_LOGS,
            labels.handler = "username_check",
            labels.status = status.to_string(),
            "username check"
        )
    }
}

fn latency(start: SystemTime) -> u64 {
    SystemTime::now()
        .duration_since(start)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn platform_label(platform: Option<Platform>) -> &'static str {
    match platform {
        Some(platform) => platform.name(),
        None => "all",
    }
}

const QUERY_LOGS: &str = "query_logs";
