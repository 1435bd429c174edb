use serde::{Deserialize, Serialize};

use super::Platform;

/// Document type under 'users/{user_id}'.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct UserData {
    pub uid: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<PlatformKeys>,
}

/// Linked platform accounts. Tokens are obtained by the client-side OAuth
/// flows and only stored here.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct PlatformKeys {
    #[serde(default)]
    pub steam_user_id: String,

    #[serde(default)]
    pub psn_account_id: String,

    #[serde(default)]
    pub psn_access_token: String,

    #[serde(default)]
    pub riot_puuid: String,

    /// VALORANT shard, e.g. "eu", "na", "ap".
    #[serde(default)]
    pub riot_shard: String,
}

impl PlatformKeys {
    pub fn is_linked(&self, platform: Platform) -> bool {
        match platform {
            Platform::Steam => !self.steam_user_id.is_empty(),
            Platform::PlayStation => {
                !self.psn_account_id.is_empty() && !self.psn_access_token.is_empty()
            }
            Platform::Riot => !self.riot_puuid.is_empty(),
            Platform::Manual => true,
        }
    }

    pub fn clear(&mut self, platform: Platform) {
        match platform {
            Platform::Steam => self.steam_user_id.clear(),
            Platform::PlayStation => {
                self.psn_account_id.clear();
                self.psn_access_token.clear();
            }
            Platform::Riot => {
                self.riot_puuid.clear();
                self.riot_shard.clear();
            }
            Platform::Manual => {}
        }
    }
}
