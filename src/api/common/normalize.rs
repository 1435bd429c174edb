use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::documents::PlatformRecord;

/// Raw per-platform title payloads as returned by the remote APIs.
///
/// Each variant is converted into a `PlatformRecord` at the adapter boundary
/// so platform-specific shapes never reach the reconciler.
#[derive(Debug, Clone)]
pub enum PlatformPayload {
    Steam(SteamOwnedGame),
    PlayStation(PsnTitle),
    Riot(RiotActivity),
}

impl PlatformPayload {
    /// Normalizes the payload into a `PlatformRecord` observed at
    /// `observed_at` (unix seconds). Playtime is always in minutes.
    pub fn normalize(self, observed_at: u64) -> PlatformRecord {
        match self {
            PlatformPayload::Steam(game) => PlatformRecord {
                platform_title_id: game.appid.to_string(),
                title: game.name,
                playtime_minutes: game.playtime_forever,
                last_observed_at: observed_at,
                ..Default::default()
            },
            PlatformPayload::PlayStation(title) => PlatformRecord {
                platform_title_id: title.title_id,
                title: title.name,
                playtime_minutes: title
                    .play_duration
                    .as_deref()
                    .and_then(iso8601_minutes)
                    .unwrap_or_default(),
                last_observed_at: observed_at,
                ..Default::default()
            },
            PlatformPayload::Riot(activity) => {
                let millis: u64 = activity.matches.iter().map(|m| m.game_length_millis).sum();
                let latest = activity.matches.iter().max_by_key(|m| m.game_start_millis);
                PlatformRecord {
                    platform_title_id: activity.game_id,
                    title: activity.title,
                    playtime_minutes: millis / 60_000,
                    ranked_data: latest.map(|latest| {
                        json!({
                            "competitiveTier": latest.competitive_tier,
                            "matchesObserved": activity.matches.len(),
                            "lastMatchAt": DateTime::from_timestamp_millis(
                                latest.game_start_millis as i64
                            )
                            .map(|t| t.to_rfc3339()),
                        })
                    }),
                    last_observed_at: observed_at,
                    ..Default::default()
                }
            }
        }
    }
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct SteamOwnedGame {
    pub appid: u64,

    #[serde(default)]
    pub name: String,

    /// Minutes.
    #[serde(default)]
    pub playtime_forever: u64,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PsnTitle {
    pub title_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub category: String,

    /// ISO-8601 duration, e.g. "PT12H3M20S".
    #[serde(default)]
    pub play_duration: Option<String>,

    #[serde(default)]
    pub last_played_date_time: Option<String>,
}

/// Recent activity on a single-title platform.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct RiotActivity {
    pub game_id: String,
    pub title: String,
    pub matches: Vec<RiotMatch>,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct RiotMatch {
    pub match_id: String,
    pub game_length_millis: u64,
    pub game_start_millis: u64,

    #[serde(default)]
    pub competitive_tier: u64,
}

/// Parses the time part of an ISO-8601 duration into whole minutes.
///
/// Supports days and the `T` components (hours, minutes, fractional
/// seconds). Seconds are truncated.
pub fn iso8601_minutes(duration: &str) -> Option<u64> {
    let rest = duration.strip_prefix('P')?;
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    let mut seconds = 0.0;
    for (value, unit) in components(date)? {
        match unit {
            'D' => seconds += value * 86_400.0,
            'W' => seconds += value * 7.0 * 86_400.0,
            _ => return None,
        }
    }
    for (value, unit) in components(time)? {
        match unit {
            'H' => seconds += value * 3_600.0,
            'M' => seconds += value * 60.0,
            'S' => seconds += value,
            _ => return None,
        }
    }
    Some((seconds / 60.0).floor() as u64)
}

fn components(part: &str) -> Option<Vec<(f64, char)>> {
    let mut components = vec![];
    let mut number = String::new();
    for c in part.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            unit => {
                components.push((number.parse::<f64>().ok()?, unit));
                number.clear();
            }
        }
    }
    match number.is_empty() {
        true => Some(components),
        false => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_durations() {
        assert_eq!(iso8601_minutes("PT12H3M20S"), Some(723));
        assert_eq!(iso8601_minutes("PT45S"), Some(0));
        assert_eq!(iso8601_minutes("PT1M59.9S"), Some(1));
        assert_eq!(iso8601_minutes("P1DT1H"), Some(1500));
        assert_eq!(iso8601_minutes("PT0S"), Some(0));
        assert_eq!(iso8601_minutes("12H"), None);
        assert_eq!(iso8601_minutes("PT12"), None);
        assert_eq!(iso8601_minutes("PT5X"), None);
    }

    #[test]
    fn steam_playtime_is_minutes() {
        let record = PlatformPayload::Steam(SteamOwnedGame {
            appid: 620,
            name: "Portal 2".to_owned(),
            playtime_forever: 754,
        })
        .normalize(1_700_000_000);

        assert_eq!(record.platform_title_id, "620");
        assert_eq!(record.playtime_minutes, 754);
        assert_eq!(record.catalog_id, None);
        assert_eq!(record.last_observed_at, 1_700_000_000);
    }

    #[test]
    fn psn_duration_converted() {
        let record = PlatformPayload::PlayStation(PsnTitle {
            title_id: "PPSA01284_00".to_owned(),
            name: "Returnal".to_owned(),
            play_duration: Some("PT2H30M".to_owned()),
            ..Default::default()
        })
        .normalize(0);

        assert_eq!(record.playtime_minutes, 150);
    }

    #[test]
    fn psn_missing_duration_is_zero() {
        let record = PlatformPayload::PlayStation(PsnTitle {
            title_id: "CUSA00001_00".to_owned(),
            play_duration: Some("garbage".to_owned()),
            ..Default::default()
        })
        .normalize(0);

        assert_eq!(record.playtime_minutes, 0);
    }

    #[test]
    fn riot_activity_sums_matches() {
        let record = PlatformPayload::Riot(RiotActivity {
            game_id: "valorant".to_owned(),
            title: "VALORANT".to_owned(),
            matches: vec![
                RiotMatch {
                    match_id: "a".to_owned(),
                    game_length_millis: 30 * 60_000,
                    game_start_millis: 1_000_000,
                    competitive_tier: 12,
                },
                RiotMatch {
                    match_id: "b".to_owned(),
                    game_length_millis: 40 * 60_000 + 59_000,
                    game_start_millis: 2_000_000,
                    competitive_tier: 14,
                },
            ],
        })
        .normalize(0);

        assert_eq!(record.playtime_minutes, 70);
        let ranked = record.ranked_data.unwrap();
        assert_eq!(ranked["competitiveTier"], 14);
        assert_eq!(ranked["matchesObserved"], 2);
        assert_eq!(ranked["lastMatchAt"], "1970-01-01T00:33:20+00:00");
    }

    #[test]
    fn riot_without_matches_has_no_ranked_data() {
        let record = PlatformPayload::Riot(RiotActivity {
            game_id: "valorant".to_owned(),
            title: "VALORANT".to_owned(),
            matches: vec![],
        })
        .normalize(0);

        assert_eq!(record.playtime_minutes, 0);
        assert_eq!(record.ranked_data, None);
    }
}
