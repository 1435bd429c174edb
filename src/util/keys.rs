use serde::Deserialize;
use std::fs;

use crate::Status;

/// Application keys loaded from a JSON key store.
///
/// Per-user platform credentials are not kept here; they live in the user
/// document.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct Keys {
    pub steam: SteamKeys,
    pub riot: RiotKeys,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct SteamKeys {
    pub client_key: String,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct RiotKeys {
    pub api_key: String,

    /// Shard used for accounts that did not record one, e.g. "eu".
    #[serde(default)]
    pub region: String,
}

impl Keys {
    pub fn from_file(filename: &str) -> Result<Keys, Status> {
        let text = fs::read_to_string(filename)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_store() {
        let keys: Keys = serde_json::from_str(
            r#"{
                "steam": { "client_key": "steam-key" },
                "riot": { "api_key": "RGAPI-key", "region": "eu" }
            }"#,
        )
        .unwrap();

        assert_eq!(keys.steam.client_key, "steam-key");
        assert_eq!(keys.riot.api_key, "RGAPI-key");
        assert_eq!(keys.riot.region, "eu");
    }

    #[test]
    fn missing_key_store() {
        assert!(Keys::from_file("/nonexistent/keys.json").is_err());
    }
}
