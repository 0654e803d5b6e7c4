//! Momentum over the most recent games.

use crate::domain::Battle;
use crate::domain::analytics::{ImprovementTrend, Last10Games, TrendDirection};

use super::overall::ResultTally;
use super::{RECENT_WINDOW, newest_first};

/// Wins at or above this among the recent window mean upward momentum.
const RISING_WINS: u32 = 6;
/// Wins at or below this among the recent window mean downward momentum.
const FALLING_WINS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Momentum {
    Up,
    Down,
    Flat,
}

impl Momentum {
    const fn from_wins(wins: u32) -> Self {
        if wins >= RISING_WINS {
            Self::Up
        } else if wins <= FALLING_WINS {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

fn recent_tally(battles: &[Battle]) -> ResultTally {
    ResultTally::of(newest_first(battles).into_iter().take(RECENT_WINDOW))
}

/// `Rising` / `Falling` / `Stable` from wins among the ten most recent
/// battles (fewer if the player has fewer).
#[must_use]
pub fn improvement_trend(battles: &[Battle]) -> ImprovementTrend {
    match Momentum::from_wins(recent_tally(battles).wins) {
        Momentum::Up => ImprovementTrend::Rising,
        Momentum::Down => ImprovementTrend::Falling,
        Momentum::Flat => ImprovementTrend::Stable,
    }
}

/// Wins, losses and an `Up` / `Down` / `Stable` label for the ten most
/// recent battles.
#[must_use]
pub fn recent_form(battles: &[Battle]) -> Last10Games {
    let tally = recent_tally(battles);
    let trend_direction = match Momentum::from_wins(tally.wins) {
        Momentum::Up => TrendDirection::Up,
        Momentum::Down => TrendDirection::Down,
        Momentum::Flat => TrendDirection::Stable,
    };
    Last10Games {
        wins: tally.wins,
        losses: tally.losses,
        trend_direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BattleResult;
    use crate::metrics::test_support::{battle, results};

    #[test]
    fn thresholds() {
        assert_eq!(improvement_trend(&results(6, 4)), ImprovementTrend::Rising);
        assert_eq!(improvement_trend(&results(5, 5)), ImprovementTrend::Stable);
        assert_eq!(improvement_trend(&results(4, 6)), ImprovementTrend::Stable);
        assert_eq!(improvement_trend(&results(3, 7)), ImprovementTrend::Falling);
    }

    #[test]
    fn only_the_ten_most_recent_count() {
        // ten recent losses, then twenty older wins
        let mut battles: Vec<Battle> = (0..10)
            .map(|i| battle(i + 1, i, BattleResult::Defeat))
            .collect();
        battles.extend((10..30).map(|i| battle(i + 1, i, BattleResult::Victory)));
        // shuffle the order: recency must come from timestamps
        battles.reverse();

        assert_eq!(improvement_trend(&battles), ImprovementTrend::Falling);
        let form = recent_form(&battles);
        assert_eq!(form.wins, 0);
        assert_eq!(form.losses, 10);
        assert_eq!(form.trend_direction, TrendDirection::Down);
    }

    #[test]
    fn fewer_than_ten_battles() {
        let form = recent_form(&results(6, 0));
        assert_eq!(form.wins, 6);
        assert_eq!(form.trend_direction, TrendDirection::Up);
    }

    #[test]
    fn both_labels_agree() {
        for wins in 0..=10 {
            let battles = results(wins, 10 - wins);
            let pair = (improvement_trend(&battles), recent_form(&battles).trend_direction);
            assert!(matches!(
                pair,
                (ImprovementTrend::Rising, TrendDirection::Up)
                    | (ImprovementTrend::Falling, TrendDirection::Down)
                    | (ImprovementTrend::Stable, TrendDirection::Stable)
            ));
        }
    }
}
