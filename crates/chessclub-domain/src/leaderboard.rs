//! Leaderboard ranking rule.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::game::GameType;

/// One club member as reported by the rating provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberPerformance {
    pub username: String,
    pub ratings: HashMap<GameType, i32>,
    pub disabled: bool,
}

/// A single `(username, rating)` row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub rating: i32,
}

/// Ordered rankings keyed by time-control.
pub type Rankings = BTreeMap<GameType, Vec<LeaderboardEntry>>;

/// Rank `members` for every requested game type.
///
/// Disabled members are dropped from every ranking. Ratings sort descending;
/// equal ratings keep the provider's order. A member without a rating for a
/// time-control ranks with 0.
pub fn rank(members: &[MemberPerformance], game_types: &[GameType]) -> Rankings {
    let active: Vec<&MemberPerformance> = members.iter().filter(|m| !m.disabled).collect();

    game_types
        .iter()
        .map(|&game| {
            let mut entries: Vec<LeaderboardEntry> = active
                .iter()
                .map(|m| LeaderboardEntry {
                    username: m.username.clone(),
                    rating: m.ratings.get(&game).copied().unwrap_or(0),
                })
                .collect();
            // `sort_by` is stable.
            entries.sort_by(|a, b| b.rating.cmp(&a.rating));
            (game, entries)
        })
        .collect()
}
