use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct BadgeTier {
    pub tier: String,
    pub required_completed_games: u64,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct BadgeProgress {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_tier: Option<BadgeTier>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<BadgeTier>,

    /// In [0, 1].
    pub progress: f64,
    pub remaining_games: u64,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct RateEligibility {
    pub can_rate: bool,
    pub playtime_hours: f64,

    #[serde(default)]
    pub reason: Option<String>,
}
