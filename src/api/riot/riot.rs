use crate::{
    api::{util, PlatformPayload, RiotActivity, RiotMatch},
    documents::{Platform, PlatformRecord},
    logging::PlatformEvent,
    traits::PlatformAdapter,
    Status,
};
use async_trait::async_trait;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// VALORANT activity for a Riot account.
///
/// The library on this platform is a single always-owned title. The fetch
/// returns exactly one record whose playtime is the sum of the most recent
/// match lengths and whose ranked data carries the latest competitive tier.
///
/// Only the last `MAX_MATCH_DETAILS` matches are counted, so the stored
/// VALORANT playtime is the largest such window seen by any sync rather than
/// lifetime playtime.
pub struct RiotApi {
    api_key: String,
    puuid: String,
    shard: String,
    host: Option<String>,
}

impl RiotApi {
    pub fn new(api_key: &str, puuid: &str, shard: &str) -> RiotApi {
        RiotApi {
            api_key: String::from(api_key),
            puuid: String::from(puuid),
            shard: String::from(shard),
            host: None,
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(String::from(host));
        self
    }

    fn host(&self) -> String {
        match &self.host {
            Some(host) => host.clone(),
            None => format!("https://{}.api.riotgames.com", self.shard),
        }
    }

    async fn get<R: serde::de::DeserializeOwned>(&self, path: &str) -> Result<R, Status> {
        let uri = format!("{}{path}", self.host());
        util::get_json::<R>(
            reqwest::Client::new()
                .get(&uri)
                .header(RIOT_TOKEN_HEADER, &self.api_key),
        )
        .await
    }

    async fn get_activity(&self) -> Result<RiotActivity, Status> {
        let matchlist = self
            .get::<MatchlistResponse>(&format!("{MATCHLISTS_SERVICE}/{}", self.puuid))
            .await?;

        let mut matches = vec![];
        for entry in latest_matches(matchlist.history) {
            let details = self
                .get::<MatchResponse>(&format!("{MATCHES_SERVICE}/{}", entry.match_id))
                .await?;
            matches.push(RiotMatch {
                competitive_tier: details
                    .players
                    .iter()
                    .find(|p| p.puuid == self.puuid)
                    .map(|p| p.competitive_tier)
                    .unwrap_or_default(),
                match_id: details.match_info.match_id,
                game_length_millis: details.match_info.game_length_millis,
                game_start_millis: details.match_info.game_start_millis,
            });
        }

        Ok(RiotActivity {
            game_id: VALORANT_GAME_ID.to_owned(),
            title: VALORANT_TITLE.to_owned(),
            matches,
        })
    }
}

#[async_trait]
impl PlatformAdapter for RiotApi {
    fn platform(&self) -> Platform {
        Platform::Riot
    }

    #[instrument(
        name = "riot::fetch_library",
        level = "trace",
        skip(self),
        fields(puuid = %self.puuid),
    )]
    async fn fetch_library(&self) -> Result<Vec<PlatformRecord>, Status> {
        let activity = match self.get_activity().await {
            Ok(activity) => activity,
            Err(status) => {
                PlatformEvent::fetch_library(Platform::Riot, &self.puuid, 0, Some(status.to_string()));
                return Err(status);
            }
        };
        info! {
            "valorant matches: {}", activity.matches.len()
        }
        PlatformEvent::fetch_library(Platform::Riot, &self.puuid, activity.matches.len(), None);

        Ok(vec![PlatformPayload::Riot(activity).normalize(util::now())])
    }
}

/// The most recent matches, newest first, that are fetched in detail.
fn latest_matches(history: Vec<MatchlistEntry>) -> Vec<MatchlistEntry> {
    history
        .into_iter()
        .sorted_by(|a, b| b.game_start_time_millis.cmp(&a.game_start_time_millis))
        .take(MAX_MATCH_DETAILS)
        .collect()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MatchlistResponse {
    #[serde(default)]
    history: Vec<MatchlistEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchlistEntry {
    match_id: String,

    #[serde(default)]
    game_start_time_millis: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchResponse {
    match_info: MatchInfo,

    #[serde(default)]
    players: Vec<MatchPlayer>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchInfo {
    match_id: String,

    #[serde(default)]
    game_length_millis: u64,

    #[serde(default)]
    game_start_millis: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchPlayer {
    puuid: String,

    #[serde(default)]
    competitive_tier: u64,
}

pub const VALORANT_GAME_ID: &str = "valorant";
const VALORANT_TITLE: &str = "VALORANT";
const RIOT_TOKEN_HEADER: &str = "X-Riot-Token";
const MATCHLISTS_SERVICE: &str = "/val/match/v1/matchlists/by-puuid";
const MATCHES_SERVICE: &str = "/val/match/v1/matches";
const MAX_MATCH_DETAILS: usize = 10;
