//! Metric calculators: pure functions from a player snapshot and battle list
//! to the analytics payload.
//!
//! Nothing in this module performs I/O or reads the clock. Inputs may be in
//! any order; calculators that care about recency sort a borrowed copy with
//! [`newest_first`]. All ratios are [`Decimal`] so that repeated
//! calculations over the same rows yield bit-identical output.

pub mod form;
pub mod mastery;
pub mod overall;
pub mod rating;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::analytics::{CustomMetrics, PlayerAnalytics, RecentForm};
use crate::domain::{Battle, Player, PlayerBrawler};

pub use form::{improvement_trend, recent_form};
pub use mastery::brawler_mastery;
pub use overall::overall_stats;
pub use rating::{clutch_rating, consistency_score, skill_rating};

/// Number of most recent battles that drive the trend and recent form.
pub const RECENT_WINDOW: usize = 10;

/// Assembles the full analytics view.
///
/// `battles` is expected to be the player's most recent battles (the service
/// passes the last 100) but may be in any order.
#[must_use]
pub fn build_analytics(
    player: &Player,
    battles: &[Battle],
    brawlers: &[PlayerBrawler],
) -> PlayerAnalytics {
    PlayerAnalytics {
        player_tag: player.tag.clone(),
        name: player.name.clone(),
        overall_stats: overall_stats(player, battles),
        custom_metrics: CustomMetrics {
            skill_rating: skill_rating(battles),
            consistency_score: consistency_score(battles),
            improvement_trend: improvement_trend(battles),
            clutch_rating: clutch_rating(battles),
        },
        brawler_mastery: brawler_mastery(brawlers),
        recent_form: RecentForm {
            last_10_games: recent_form(battles),
        },
    }
}

/// Returns references to `battles` ordered newest first.
///
/// Ties on the parsed timestamp fall back to the raw timestamp string and
/// then to the row id, so the order is total and deterministic.
#[must_use]
pub fn newest_first(battles: &[Battle]) -> Vec<&Battle> {
    let mut sorted: Vec<&Battle> = battles.iter().collect();
    sorted.sort_by(|a, b| {
        b.battle_date_time
            .cmp(&a.battle_date_time)
            .then_with(|| b.battle_time.cmp(&a.battle_time))
            .then_with(|| b.id.cmp(&a.id))
    });
    sorted
}

/// `part / total * 100` rounded to two decimal places; zero when `total` is
/// zero.
#[must_use]
pub fn percentage(part: u32, total: u32) -> Decimal {
    if total == 0 {
        return to_hundredths(Decimal::ZERO);
    }
    to_hundredths(Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(total))
}

/// Rounds half away from zero to two decimal places and pins the scale, so
/// that `50` renders as `50.00`.
#[must_use]
pub fn to_hundredths(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
