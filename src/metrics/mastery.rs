//! Brawler mastery ranking.

use crate::domain::PlayerBrawler;
use crate::domain::analytics::{BrawlerMastery, MasteryLevel};

/// Number of brawlers listed in the mastery block.
pub const MASTERY_TOP_N: usize = 5;

/// Top brawlers by current trophies (ties: lower brawler id first), each
/// labelled from its rank.
#[must_use]
pub fn brawler_mastery(brawlers: &[PlayerBrawler]) -> Vec<BrawlerMastery> {
    let mut ranked: Vec<&PlayerBrawler> = brawlers.iter().collect();
    ranked.sort_by(|a, b| {
        b.trophies
            .cmp(&a.trophies)
            .then_with(|| a.brawler_id.cmp(&b.brawler_id))
    });

    ranked
        .into_iter()
        .take(MASTERY_TOP_N)
        .map(|b| BrawlerMastery {
            brawler_id: b.brawler_id,
            name: b.brawler_name.clone(),
            mastery_level: MasteryLevel::from_rank(b.rank),
            win_rate: b.win_rate,
            games_played: b.total_battles,
            trophies: b.trophies,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{PlayerId, PlayerTag};

    fn brawler(id: i32, trophies: i32, rank: i32) -> PlayerBrawler {
        PlayerBrawler {
            player_id: PlayerId::new(),
            player_tag: PlayerTag::from_trusted("#TEST"),
            brawler_id: id,
            brawler_name: format!("B{id}"),
            power: 11,
            rank,
            trophies,
            highest_trophies: trophies,
            total_battles: 4,
            wins: 1,
            losses: 3,
            win_rate: Decimal::new(2500, 2),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn keeps_top_five_by_trophies() {
        let brawlers: Vec<PlayerBrawler> = (0..8).map(|i| brawler(i, 100 * i, 10)).collect();
        let top = brawler_mastery(&brawlers);
        let ids: Vec<i32> = top.iter().map(|m| m.brawler_id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn ties_break_on_lower_id() {
        let brawlers = vec![brawler(9, 500, 10), brawler(2, 500, 10)];
        let ids: Vec<i32> = brawler_mastery(&brawlers)
            .iter()
            .map(|m| m.brawler_id)
            .collect();
        assert_eq!(ids, vec![2, 9]);
    }

    #[test]
    fn carries_rank_label_and_derived_stats() {
        let top = brawler_mastery(&[brawler(1, 900, 31), brawler(2, 800, 22)]);
        let Some(first) = top.first() else {
            panic!("expected a mastery entry");
        };
        assert_eq!(first.mastery_level, MasteryLevel::Master);
        assert_eq!(first.games_played, 4);
        assert_eq!(first.win_rate.to_string(), "25.00");
        assert_eq!(top.get(1).map(|m| m.mastery_level), Some(MasteryLevel::Advanced));
    }

    #[test]
    fn empty_roster() {
        assert!(brawler_mastery(&[]).is_empty());
    }
}
