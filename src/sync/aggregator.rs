//! Per-brawler statistics recomputation.

use std::collections::BTreeMap;

use crate::domain::{Battle, BattleResult, BrawlerStatsUpdate, PlayerBrawler, PlayerId, PlayerTag};
use crate::metrics::percentage;

#[derive(Debug, Default)]
struct Counter {
    name: String,
    total: u32,
    wins: u32,
    losses: u32,
}

/// Recomputes the derived counters of every brawler that appears in
/// `existing` or `battles`.
///
/// This is a full overwrite, never an increment: brawlers that have no
/// battle in `battles` come back with zero counters, and running it twice
/// over the same input yields identical updates. Output is ordered by
/// brawler id.
#[must_use]
pub fn recompute_brawler_stats(
    player_id: PlayerId,
    tag: &PlayerTag,
    existing: &[PlayerBrawler],
    battles: &[Battle],
) -> Vec<BrawlerStatsUpdate> {
    let mut counters: BTreeMap<i32, Counter> = BTreeMap::new();

    for row in existing {
        counters.entry(row.brawler_id).or_insert_with(|| Counter {
            name: row.brawler_name.clone(),
            ..Counter::default()
        });
    }

    for battle in battles {
        let counter = counters.entry(battle.brawler.id).or_insert_with(|| Counter {
            name: battle.brawler.name.clone(),
            ..Counter::default()
        });
        counter.total = counter.total.saturating_add(1);
        match battle.result {
            BattleResult::Victory => counter.wins = counter.wins.saturating_add(1),
            BattleResult::Defeat => counter.losses = counter.losses.saturating_add(1),
            BattleResult::Draw => {}
        }
    }

    counters
        .into_iter()
        .map(|(brawler_id, counter)| BrawlerStatsUpdate {
            player_id,
            player_tag: tag.clone(),
            brawler_id,
            brawler_name: counter.name,
            total_battles: to_i32(counter.total),
            wins: to_i32(counter.wins),
            losses: to_i32(counter.losses),
            win_rate: percentage(counter.wins, counter.total),
        })
        .collect()
}

fn to_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
