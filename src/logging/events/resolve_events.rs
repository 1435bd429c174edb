use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use valuable::Valuable;

use crate::{documents::Platform, log_event, logging::LogEvent, Status};

#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
pub struct ResolveEvent {
    platform: Platform,
    platform_title_id: String,
    result: Response,
}

#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
enum Response {
    Resolved(u64),
    Unresolved,
    Error(String),
}

impl ResolveEvent {
    pub fn resolve(
        platform: Platform,
        platform_title_id: &str,
        response: &Result<Option<u64>, Status>,
    ) {
        log_event!(LogEvent::Resolve(ResolveEvent {
            platform,
            platform_title_id: platform_title_id.to_owned(),
            result: match response {
                Ok(Some(catalog_id)) => Response::Resolved(*catalog_id),
                Ok(None) => Response::Unresolved,
                Err(status) => Response::Error(status.to_string()),
            },
        }))
    }
}
