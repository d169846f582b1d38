//! Winners and statistics derived from accepted moves and game records.
//!
//! All of these are plain folds over their inputs; nothing is cached.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::GameRecord;
use crate::core::{ModeId, PlayerId};
use crate::reconcile::AcceptedMove;

/// Per-player numbers for one round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Accepted matches.
    pub matches: u32,
    /// Time from round start to the player's last accepted match.
    pub elapsed_ms: u64,
}

/// Every submitter with the highest accepted-move count, sorted by id.
///
/// Ties produce several winners. An empty history has no winners.
#[must_use]
pub fn winners(moves: &[AcceptedMove]) -> Vec<PlayerId> {
    let counts = move_counts(moves);
    let Some(best) = counts.values().copied().max() else {
        return Vec::new();
    };
    counts
        .into_iter()
        .filter(|&(_, count)| count == best)
        .map(|(player, _)| player)
        .collect()
}

fn move_counts(moves: &[AcceptedMove]) -> BTreeMap<PlayerId, u32> {
    let mut counts = BTreeMap::new();
    for mv in moves {
        *counts.entry(mv.submitter.clone()).or_insert(0) += 1;
    }
    counts
}

/// Group accepted moves by submitter.
///
/// Players listed in `roster` appear even with no matches.
#[must_use]
pub fn player_stats(
    moves: &[AcceptedMove],
    roster: &[PlayerId],
    started_at_ms: u64,
) -> BTreeMap<PlayerId, PlayerStats> {
    let mut stats: BTreeMap<PlayerId, PlayerStats> = roster
        .iter()
        .map(|p| (p.clone(), PlayerStats::default()))
        .collect();
    for mv in moves {
        let entry = stats.entry(mv.submitter.clone()).or_default();
        entry.matches += 1;
        entry.elapsed_ms = entry
            .elapsed_ms
            .max(mv.timestamp_ms.saturating_sub(started_at_ms));
    }
    stats
}

/// Player-count bucket used to filter records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerCategory {
    Solo,
    Multiplayer,
}

impl PlayerCategory {
    /// Category of a round with `player_count` players.
    #[must_use]
    pub fn of(player_count: u32) -> Self {
        if player_count <= 1 {
            PlayerCategory::Solo
        } else {
            PlayerCategory::Multiplayer
        }
    }
}

/// Which records an aggregate covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub mode: Option<ModeId>,
    pub category: Option<PlayerCategory>,
}

impl RecordFilter {
    /// Filter to one mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ModeId) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Filter to one player-count category.
    #[must_use]
    pub fn with_category(mut self, category: PlayerCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Check whether a record passes the filter.
    #[must_use]
    pub fn matches(&self, record: &GameRecord) -> bool {
        self.mode.map_or(true, |m| m == record.mode)
            && self
                .category
                .map_or(true, |c| c == PlayerCategory::of(record.player_count))
    }
}

/// One player's numbers across many finished rounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub finished_rounds: u32,
    pub total_matches: u32,
    pub avg_matches_per_round: f64,
    /// Shortest round the player won.
    pub fastest_win_ms: Option<u64>,
    pub avg_duration_ms: f64,
}

impl AggregateStats {
    /// Aggregate `player`'s records that pass `filter`.
    ///
    /// A record counts when the player is on its roster.
    #[must_use]
    pub fn compute(player: &PlayerId, records: &[GameRecord], filter: &RecordFilter) -> Self {
        let mut stats = Self::default();
        let mut total_duration: u64 = 0;

        for record in records
            .iter()
            .filter(|r| filter.matches(r) && r.players.contains(player))
        {
            let duration = record.duration_ms();
            stats.finished_rounds += 1;
            stats.total_matches += record.player_stats.get(player).map_or(0, |s| s.matches);
            total_duration += duration;
            if record.winners.contains(player) {
                stats.fastest_win_ms = Some(stats.fastest_win_ms.map_or(duration, |d| d.min(duration)));
            }
        }

        if stats.finished_rounds > 0 {
            let rounds = stats.finished_rounds as f64;
            stats.avg_matches_per_round = stats.total_matches as f64 / rounds;
            stats.avg_duration_ms = total_duration as f64 / rounds;
        }
        stats
    }
}
