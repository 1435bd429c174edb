use crate::{
    api::{util, PlatformPayload, PsnTitle},
    documents::{Platform, PlatformRecord},
    logging::PlatformEvent,
    traits::PlatformAdapter,
    Status,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// PlayStation Network played-games list.
///
/// Requires an OAuth access token obtained by the client; an expired token
/// surfaces as `Status::AuthExpired`.
pub struct PsnApi {
    account_id: String,
    access_token: String,
    host: String,
}

impl PsnApi {
    pub fn new(account_id: &str, access_token: &str) -> PsnApi {
        PsnApi {
            account_id: String::from(account_id),
            access_token: String::from(access_token),
            host: String::from(PSN_HOST),
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = String::from(host);
        self
    }

    async fn get_titles_page(&self, offset: usize) -> Result<TitlesResponse, Status> {
        let uri = format!(
            "{}{PSN_GAMELIST_SERVICE}/users/{}/titles?categories={PSN_CATEGORIES}&limit={PAGE_SIZE}&offset={offset}",
            self.host, self.account_id,
        );
        util::get_json::<TitlesResponse>(
            reqwest::Client::new()
                .get(&uri)
                .bearer_auth(&self.access_token),
        )
        .await
    }
}

#[async_trait]
impl PlatformAdapter for PsnApi {
    fn platform(&self) -> Platform {
        Platform::PlayStation
    }

    #[instrument(
        name = "psn::fetch_library",
        level = "trace",
        skip(self),
        fields(account_id = %self.account_id),
    )]
    async fn fetch_library(&self) -> Result<Vec<PlatformRecord>, Status> {
        let mut titles = vec![];
        let mut offset = Some(0);
        let mut pages = 0;

        while let Some(next) = offset {
            if pages == MAX_PAGES {
                warn!("PSN titles truncated after {pages} pages for {}", self.account_id);
                break;
            }

            let page = match self.get_titles_page(next).await {
                Ok(page) => page,
                Err(status) => {
                    PlatformEvent::fetch_library(
                        Platform::PlayStation,
                        &self.account_id,
                        titles.len(),
                        Some(status.to_string()),
                    );
                    return Err(status);
                }
            };
            pages += 1;

            offset = next_page(next, page.titles.len(), page.next_offset);
            titles.extend(page.titles);
        }

        info! {
            "psn titles: {}", titles.len()
        }
        PlatformEvent::fetch_library(Platform::PlayStation, &self.account_id, titles.len(), None);

        let observed_at = util::now();
        Ok(titles
            .into_iter()
            .map(|title| PlatformPayload::PlayStation(title).normalize(observed_at))
            .collect())
    }
}

/// Offset of the page after the one at `offset`. Stops on an empty page or
/// when the service does not move forward.
fn next_page(offset: usize, received: usize, next_offset: Option<usize>) -> Option<usize> {
    match next_offset {
        Some(next_offset) if received > 0 && next_offset > offset => Some(next_offset),
        _ => None,
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitlesResponse {
    #[serde(default)]
    titles: Vec<PsnTitle>,

    #[serde(default)]
    next_offset: Option<usize>,

    #[serde(default)]
    total_item_count: usize,
}

const PSN_HOST: &str = "https://m.np.playstation.com";
const PSN_GAMELIST_SERVICE: &str = "/api/gamelist/v2";
const PSN_CATEGORIES: &str = "ps4_game,ps5_native_game";
const PAGE_SIZE: usize = 200;
const MAX_PAGES: usize = 25;

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };
    use warp::Filter;

    #[test]
    fn parse_titles_page() {
        let page = serde_json::from_str::<TitlesResponse>(
            r#"{
                "titles": [{
                    "titleId": "PPSA01284_00",
                    "name": "Returnal",
                    "category": "ps5_native_game",
                    "playCount": 31,
                    "playDuration": "PT41H12M7S",
                    "lastPlayedDateTime": "2023-05-01T20:11:00.000Z"
                }],
                "nextOffset": 200,
                "previousOffset": 0,
                "totalItemCount": 345
            }"#,
        )
        .unwrap();

        assert_eq!(page.titles.len(), 1);
        assert_eq!(page.titles[0].title_id, "PPSA01284_00");
        assert_eq!(page.titles[0].play_duration.as_deref(), Some("PT41H12M7S"));
        assert_eq!(page.next_offset, Some(200));
        assert_eq!(page.total_item_count, 345);
    }

    #[test]
    fn parse_last_page() {
        let page = serde_json::from_str::<TitlesResponse>(
            r#"{"titles": [], "totalItemCount": 0}"#,
        )
        .unwrap();

        assert!(page.titles.is_empty());
        assert_eq!(page.next_offset, None);
    }

    #[test]
    fn paging_stops_when_not_moving_forward() {
        assert_eq!(next_page(0, 200, Some(200)), Some(200));
        assert_eq!(next_page(200, 145, None), None);
        assert_eq!(next_page(200, 0, Some(400)), None);
        assert_eq!(next_page(200, 10, Some(200)), None);
        assert_eq!(next_page(400, 10, Some(200)), None);
    }

    fn title(id: &str) -> serde_json::Value {
        serde_json::json!({"titleId": id, "name": id, "playDuration": "PT2H"})
    }

    #[tokio::test]
    async fn fetch_follows_pages() {
        let routes = warp::any()
            .and(warp::header::<String>("authorization"))
            .and(warp::query::<HashMap<String, String>>())
            .map(|auth: String, query: HashMap<String, String>| {
                assert_eq!(auth, "Bearer token");
                let page = match query.get("offset").map(String::as_str) {
                    Some("0") => serde_json::json!({
                        "titles": [title("PPSA01284_00"), title("CUSA00001_00")],
                        "nextOffset": 2,
                    }),
                    _ => serde_json::json!({"titles": [title("CUSA00002_00")]}),
                };
                warp::reply::json(&page)
            });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let records = PsnApi::new("account", "token")
            .with_host(&format!("http://{addr}"))
            .fetch_library()
            .await
            .unwrap();

        assert_eq!(
            records
                .iter()
                .map(|r| r.platform_title_id.as_str())
                .collect::<Vec<_>>(),
            vec!["PPSA01284_00", "CUSA00001_00", "CUSA00002_00"]
        );
        assert_eq!(records[0].playtime_minutes, 120);
    }

    #[tokio::test]
    async fn fetch_is_capped_at_max_pages() {
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);
        let routes = warp::any()
            .and(warp::query::<HashMap<String, String>>())
            .map(move |query: HashMap<String, String>| {
                counter.fetch_add(1, Ordering::SeqCst);
                let offset = query
                    .get("offset")
                    .and_then(|offset| offset.parse::<usize>().ok())
                    .unwrap_or_default();
                warp::reply::json(&serde_json::json!({
                    "titles": [title(&format!("CUSA{offset:05}_00"))],
                    "nextOffset": offset + 1,
                }))
            });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let records = PsnApi::new("account", "token")
            .with_host(&format!("http://{addr}"))
            .fetch_library()
            .await
            .unwrap();

        assert_eq!(records.len(), MAX_PAGES);
        assert_eq!(requests.load(Ordering::SeqCst), MAX_PAGES);
    }

    #[tokio::test]
    async fn expired_token_is_auth_expired() {
        let routes = warp::any().map(|| {
            warp::reply::with_status(warp::reply(), warp::http::StatusCode::UNAUTHORIZED)
        });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let result = PsnApi::new("account", "expired")
            .with_host(&format!("http://{addr}"))
            .fetch_library()
            .await;

        assert!(matches!(result, Err(Status::AuthExpired(_))));
    }
}
