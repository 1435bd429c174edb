use crate::{
    api::{util, PlatformPayload, SteamOwnedGame},
    documents::{Platform, PlatformRecord},
    logging::PlatformEvent,
    traits::PlatformAdapter,
    Status,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub struct SteamApi {
    steam_key: String,
    steam_user_id: String,
    host: String,
}

impl SteamApi {
    pub fn new(steam_key: &str, steam_user_id: &str) -> SteamApi {
        SteamApi {
            steam_key: String::from(steam_key),
            steam_user_id: String::from(steam_user_id),
            host: String::from(STEAM_HOST),
        }
    }

    /// Points the client to a different API host, e.g. a local fake.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = String::from(host);
        self
    }
}

#[async_trait]
impl PlatformAdapter for SteamApi {
    fn platform(&self) -> Platform {
        Platform::Steam
    }

    #[instrument(
        name = "steam::fetch_library",
        level = "trace",
        skip(self),
        fields(steam_id = %self.steam_user_id),
    )]
    async fn fetch_library(&self) -> Result<Vec<PlatformRecord>, Status> {
        let uri = format!(
            "{}{STEAM_GETOWNEDGAMES_SERVICE}?key={}&steamid={}&include_appinfo=true&include_played_free_games=true&format=json",
            self.host, self.steam_key, self.steam_user_id
        );

        let resp = match util::get_json::<SteamResponse>(reqwest::Client::new().get(&uri)).await {
            Ok(resp) => resp,
            Err(status) => {
                PlatformEvent::fetch_library(
                    Platform::Steam,
                    &self.steam_user_id,
                    0,
                    Some(status.to_string()),
                );
                return Err(status);
            }
        };
        info! {
            "steam games: {}", resp.response.game_count
        }
        PlatformEvent::fetch_library(
            Platform::Steam,
            &self.steam_user_id,
            resp.response.games.len(),
            None,
        );

        let observed_at = util::now();
        Ok(resp
            .response
            .games
            .into_iter()
            .map(|game| PlatformPayload::Steam(game).normalize(observed_at))
            .collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SteamResponse {
    response: GetOwnedGamesResponse,
}

/// Private profiles return an empty `response` object.
#[derive(Debug, Default, Serialize, Deserialize)]
struct GetOwnedGamesResponse {
    #[serde(default)]
    game_count: usize,

    #[serde(default)]
    games: Vec<SteamOwnedGame>,
}

const STEAM_HOST: &str = "https://api.steampowered.com";
const STEAM_GETOWNEDGAMES_SERVICE: &str = "/IPlayerService/GetOwnedGames/v0001/";
