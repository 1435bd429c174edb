use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use valuable::Valuable;

use crate::Status;

/// Source that contributed a game to a user's library.
#[derive(
    Serialize, Deserialize, Valuable, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Manual,
    Steam,
    #[serde(rename = "playstation")]
    PlayStation,
    Riot,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Manual => "manual",
            Platform::Steam => "steam",
            Platform::PlayStation => "playstation",
            Platform::Riot => "riot",
        }
    }

    /// Platforms that can be synced from a remote account.
    pub fn remote() -> [Platform; 3] {
        [Platform::Steam, Platform::PlayStation, Platform::Riot]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Platform {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Platform::Manual),
            "steam" => Ok(Platform::Steam),
            "playstation" | "psn" => Ok(Platform::PlayStation),
            "riot" | "valorant" => Ok(Platform::Riot),
            _ => Err(Status::invalid_argument(format!(
                "Platform '{s}' is not valid."
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_platform_names() {
        assert_eq!("steam".parse::<Platform>(), Ok(Platform::Steam));
        assert_eq!("psn".parse::<Platform>(), Ok(Platform::PlayStation));
        assert_eq!("valorant".parse::<Platform>(), Ok(Platform::Riot));
        assert!("gog".parse::<Platform>().is_err());
    }

    #[test]
    fn serde_names_match_display() {
        for platform in [
            Platform::Manual,
            Platform::Steam,
            Platform::PlayStation,
            Platform::Riot,
        ] {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{platform}\""));
        }
    }
}
