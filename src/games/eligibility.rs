use crate::documents::{BadgeProgress, BadgeTier, CombinedLibraryEntry, EntryStatus, RateEligibility};

/// Minimum playtime before a game can be rated.
pub const MIN_HOURS_TO_RATE: f64 = 2.0;

/// Returns whether the game `catalog_id` can be rated from `library`.
///
/// The computed playtime and the reason for a refusal are returned alongside
/// the decision so callers never recompute them.
pub fn can_rate(library: &[CombinedLibraryEntry], catalog_id: u64) -> RateEligibility {
    let entry = match library.iter().find(|e| e.entry.catalog_id == catalog_id) {
        Some(combined) => &combined.entry,
        None => {
            return RateEligibility {
                can_rate: false,
                playtime_hours: 0.0,
                reason: Some("Game is not in your library.".to_owned()),
            }
        }
    };

    let playtime_hours = entry.playtime_hours();
    match playtime_hours >= MIN_HOURS_TO_RATE {
        true => RateEligibility {
            can_rate: true,
            playtime_hours,
            reason: None,
        },
        false => RateEligibility {
            can_rate: false,
            playtime_hours,
            reason: Some(format!(
                "Play at least {MIN_HOURS_TO_RATE:.0} hours before rating ({playtime_hours:.1} hours played)."
            )),
        },
    }
}

pub fn completed_games(library: &[CombinedLibraryEntry]) -> u64 {
    library
        .iter()
        .filter(|e| e.entry.status == Some(EntryStatus::Completed))
        .count() as u64
}

/// Computes progress towards the next badge tier.
///
/// The current tier is the largest threshold not above `completed`. Below
/// the first threshold the current tier is `None` and progress is measured
/// from zero. At the top tier progress is 1.0 and no games remain.
pub fn badge_progress(tiers: &[BadgeTier], completed: u64) -> BadgeProgress {
    let mut tiers = tiers.to_vec();
    tiers.sort_by_key(|t| t.required_completed_games);

    let current = tiers
        .iter()
        .rposition(|t| t.required_completed_games <= completed);
    let next = match current {
        Some(i) => tiers.get(i + 1),
        None => tiers.first(),
    };
    let current = current.map(|i| tiers[i].clone());

    match next {
        None => BadgeProgress {
            current_tier: current,
            next_tier: None,
            progress: 1.0,
            remaining_games: 0,
        },
        Some(next) => {
            let floor = current
                .as_ref()
                .map_or(0, |t| t.required_completed_games);
            let span = next.required_completed_games.saturating_sub(floor);
            let progress = match span {
                0 => 1.0,
                span => (completed.saturating_sub(floor) as f64 / span as f64).clamp(0.0, 1.0),
            };

            BadgeProgress {
                current_tier: current,
                next_tier: Some(next.clone()),
                progress,
                remaining_games: next.required_completed_games.saturating_sub(completed),
            }
        }
    }
}
