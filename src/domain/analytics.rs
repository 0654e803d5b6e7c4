//! Analytics read model.
//!
//! [`PlayerAnalytics`] is assembled per request by
//! [`crate::metrics::build_analytics`] and never stored, so it can always be
//! reproduced from the stored player, battles and player brawlers.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::PlayerTag;

/// Full analytics payload for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlayerAnalytics {
    /// Player tag.
    #[schema(value_type = String)]
    pub player_tag: PlayerTag,
    /// Display name.
    pub name: String,
    /// Aggregate counters over the analysed battles.
    pub overall_stats: OverallStats,
    /// Heuristic ratings.
    pub custom_metrics: CustomMetrics,
    /// Top brawlers by trophies.
    pub brawler_mastery: Vec<BrawlerMastery>,
    /// Last ten games.
    pub recent_form: RecentForm,
}

/// Win/loss counters and favourite mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OverallStats {
    /// Current trophies.
    pub total_trophies: i32,
    /// Highest trophies.
    pub highest_trophies: i32,
    /// `wins / total_battles * 100`, two decimal places.
    #[schema(value_type = String)]
    pub win_rate: Decimal,
    /// Battles analysed.
    pub total_battles: u32,
    /// Victories.
    pub wins: u32,
    /// Defeats.
    pub losses: u32,
    /// Draws (including unreported results).
    pub draws: u32,
    /// Most played mode.
    pub favorite_mode: Option<String>,
}

/// Heuristic ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomMetrics {
    /// Rating in `[1000, 2500]`, 1500 at a 50% win rate.
    pub skill_rating: i32,
    /// `0..=100`, higher means steadier trophy swings.
    #[schema(value_type = String)]
    pub consistency_score: Decimal,
    /// Direction of the last ten games.
    pub improvement_trend: ImprovementTrend,
    /// Share of star-player battles, `0..=100`.
    #[schema(value_type = String)]
    pub clutch_rating: Decimal,
}

/// Label for the last ten games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ImprovementTrend {
    /// Six or more wins.
    Rising,
    /// Three or fewer wins.
    Falling,
    /// Anything in between.
    Stable,
}

/// Mastery entry for one of the top brawlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BrawlerMastery {
    /// Catalog id.
    pub brawler_id: i32,
    /// Brawler name.
    pub name: String,
    /// Label derived from rank.
    pub mastery_level: MasteryLevel,
    /// Derived win rate.
    #[schema(value_type = String)]
    pub win_rate: Decimal,
    /// Derived battle count.
    pub games_played: i32,
    /// Current trophies.
    pub trophies: i32,
}

/// Coarse mastery label derived from a brawler's rank tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum MasteryLevel {
    /// Rank 30 and above.
    Master,
    /// Rank 25-29.
    Expert,
    /// Rank 20-24.
    Advanced,
    /// Rank 15-19.
    Intermediate,
    /// Below rank 15.
    Beginner,
}

impl MasteryLevel {
    /// Maps a rank tier to its label.
    #[must_use]
    pub const fn from_rank(rank: i32) -> Self {
        match rank {
            r if r >= 30 => Self::Master,
            r if r >= 25 => Self::Expert,
            r if r >= 20 => Self::Advanced,
            r if r >= 15 => Self::Intermediate,
            _ => Self::Beginner,
        }
    }
}

/// Recent form block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecentForm {
    /// Summary of the ten most recent games.
    pub last_10_games: Last10Games,
}

/// Wins and losses among the ten most recent games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Last10Games {
    /// Victories.
    pub wins: u32,
    /// Defeats.
    pub losses: u32,
    /// Direction label.
    pub trend_direction: TrendDirection,
}

/// Direction label for recent form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum TrendDirection {
    /// Six or more wins.
    Up,
    /// Three or fewer wins.
    Down,
    /// Anything in between.
    Stable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_thresholds() {
        assert_eq!(MasteryLevel::from_rank(35), MasteryLevel::Master);
        assert_eq!(MasteryLevel::from_rank(30), MasteryLevel::Master);
        assert_eq!(MasteryLevel::from_rank(29), MasteryLevel::Expert);
        assert_eq!(MasteryLevel::from_rank(25), MasteryLevel::Expert);
        assert_eq!(MasteryLevel::from_rank(20), MasteryLevel::Advanced);
        assert_eq!(MasteryLevel::from_rank(15), MasteryLevel::Intermediate);
        assert_eq!(MasteryLevel::from_rank(14), MasteryLevel::Beginner);
        assert_eq!(MasteryLevel::from_rank(0), MasteryLevel::Beginner);
    }

    #[test]
    fn labels_serialize_as_plain_names() {
        let json = serde_json::to_string(&ImprovementTrend::Rising).unwrap_or_default();
        assert_eq!(json, "\"Rising\"");
        let json = serde_json::to_string(&TrendDirection::Down).unwrap_or_default();
        assert_eq!(json, "\"Down\"");
    }
}
