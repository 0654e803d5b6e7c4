//! Overall win/loss counters and favourite mode.

use std::collections::HashMap;

use crate::domain::analytics::OverallStats;
use crate::domain::{Battle, BattleResult, Player};

use super::{newest_first, percentage};

/// Counts of each result over a battle list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultTally {
    /// Victories.
    pub wins: u32,
    /// Defeats.
    pub losses: u32,
    /// Draws.
    pub draws: u32,
}

impl ResultTally {
    /// Tallies the results of `battles`.
    pub fn of<'a>(battles: impl IntoIterator<Item = &'a Battle>) -> Self {
        battles
            .into_iter()
            .fold(Self::default(), |mut tally, battle| {
                match battle.result {
                    BattleResult::Victory => tally.wins += 1,
                    BattleResult::Defeat => tally.losses += 1,
                    BattleResult::Draw => tally.draws += 1,
                }
                tally
            })
    }

    /// Total number of battles tallied.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Computes the overall block of the analytics view.
#[must_use]
pub fn overall_stats(player: &Player, battles: &[Battle]) -> OverallStats {
    let tally = ResultTally::of(battles);
    OverallStats {
        total_trophies: player.trophies,
        highest_trophies: player.highest_trophies,
        win_rate: percentage(tally.wins, tally.total()),
        total_battles: tally.total(),
        wins: tally.wins,
        losses: tally.losses,
        draws: tally.draws,
        favorite_mode: favorite_mode(battles),
    }
}

/// Most played mode.
///
/// Ties go to the mode that was played most recently: battles are scanned
/// newest first and the first mode to reach the winning count keeps its
/// place.
#[must_use]
pub fn favorite_mode(battles: &[Battle]) -> Option<String> {
    // mode -> (count, first-seen position in newest-first order)
    let mut counts: HashMap<&str, (u32, usize)> = HashMap::new();
    for (position, battle) in newest_first(battles).into_iter().enumerate() {
        counts
            .entry(battle.mode.as_str())
            .or_insert((0, position))
            .0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, seen_a)), (_, (count_b, seen_b))| {
            count_a.cmp(count_b).then_with(|| seen_b.cmp(seen_a))
        })
        .map(|(mode, _)| mode.to_string())
}
