//! Skill, consistency and clutch ratings.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

use crate::domain::Battle;

use super::overall::ResultTally;
use super::{percentage, to_hundredths};

/// Rating at a 50% win rate and for players without battles.
pub const BASE_SKILL_RATING: i32 = 1500;
/// Lowest possible skill rating.
pub const MIN_SKILL_RATING: i32 = 1000;
/// Highest possible skill rating.
pub const MAX_SKILL_RATING: i32 = 2500;
/// Below this many battles the consistency score is neutral.
pub const MIN_BATTLES_FOR_CONSISTENCY: usize = 5;

/// Neutral score for consistency and clutch when there is no data.
fn neutral() -> Decimal {
    to_hundredths(Decimal::from(50))
}

/// `1500 + round((win_fraction - 0.5) * 1000)`, clamped to `[1000, 2500]`.
#[must_use]
pub fn skill_rating(battles: &[Battle]) -> i32 {
    let tally = ResultTally::of(battles);
    let total = tally.total();
    if total == 0 {
        return BASE_SKILL_RATING;
    }

    let fraction = Decimal::from(tally.wins) / Decimal::from(total);
    let adjustment = ((fraction - Decimal::new(5, 1)) * Decimal::ONE_THOUSAND)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(0);

    BASE_SKILL_RATING
        .saturating_add(adjustment)
        .clamp(MIN_SKILL_RATING, MAX_SKILL_RATING)
}

/// `clamp(100 - stddev(trophy changes) * 5, 0, 100)`.
///
/// Neutral (50) with fewer than [`MIN_BATTLES_FOR_CONSISTENCY`] battles or
/// when no battle reports a trophy change. The standard deviation is the
/// population one.
#[must_use]
pub fn consistency_score(battles: &[Battle]) -> Decimal {
    if battles.len() < MIN_BATTLES_FOR_CONSISTENCY {
        return neutral();
    }

    let changes: Vec<Decimal> = battles
        .iter()
        .filter_map(|b| b.trophy_change)
        .map(Decimal::from)
        .collect();
    let Some(std_dev) = population_std_dev(&changes) else {
        return neutral();
    };

    let score = Decimal::ONE_HUNDRED - std_dev * Decimal::from(5);
    to_hundredths(score.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
}

/// Share of battles where the player was star player, in percent. Neutral
/// (50) without battles.
#[must_use]
pub fn clutch_rating(battles: &[Battle]) -> Decimal {
    let total = u32::try_from(battles.len()).unwrap_or(u32::MAX);
    if total == 0 {
        return neutral();
    }
    let stars = u32::try_from(battles.iter().filter(|b| b.is_star_player).count())
        .unwrap_or(u32::MAX);
    percentage(stars, total)
}

fn population_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let n = Decimal::from(values.len());
    let mean = values.iter().copied().sum::<Decimal>() / n;
    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / n;
    variance.sqrt()
}
