//! Row types for the PostgreSQL tables and their conversions to domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Battle, BattleResult, Brawler, BrawlerUsage, Club, Player, PlayerBrawler, PlayerId, PlayerTag,
};

/// A row of the `players` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Internal id.
    pub id: Uuid,
    /// Normalized tag.
    pub tag: String,
    /// Display name.
    pub name: String,
    /// Current trophies.
    pub trophies: i32,
    /// Highest trophies.
    pub highest_trophies: i32,
    /// Experience level.
    pub exp_level: i32,
    /// Experience points.
    pub exp_points: i32,
    /// 3v3 victories.
    pub victories_3v3: i32,
    /// Solo victories.
    pub solo_victories: i32,
    /// Duo victories.
    pub duo_victories: i32,
    /// Club tag.
    pub club_tag: Option<String>,
    /// Club name.
    pub club_name: Option<String>,
    /// First tracked.
    pub created_at: DateTime<Utc>,
    /// Last refresh.
    pub last_updated: DateTime<Utc>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        let club = row.club_tag.map(|tag| Club {
            tag,
            name: row.club_name.unwrap_or_default(),
        });
        Self {
            id: PlayerId::from_uuid(row.id),
            tag: PlayerTag::from_trusted(&row.tag),
            name: row.name,
            trophies: row.trophies,
            highest_trophies: row.highest_trophies,
            exp_level: row.exp_level,
            exp_points: row.exp_points,
            victories_3v3: row.victories_3v3,
            solo_victories: row.solo_victories,
            duo_victories: row.duo_victories,
            club,
            created_at: row.created_at,
            last_updated: row.last_updated,
        }
    }
}

/// A row of the `battles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BattleRow {
    /// Row id.
    pub id: i64,
    /// Owning player.
    pub player_id: Uuid,
    /// Owning player's tag.
    pub player_tag: String,
    /// Raw external timestamp.
    pub battle_time: String,
    /// Parsed timestamp.
    pub battle_date_time: DateTime<Utc>,
    /// Game mode.
    pub mode: String,
    /// Map name.
    pub map: Option<String>,
    /// `victory`, `defeat` or `draw`.
    pub result: String,
    /// Trophy delta.
    pub trophy_change: Option<i32>,
    /// Duration in seconds.
    pub duration: Option<i32>,
    /// Star player flag.
    pub is_star_player: bool,
    /// Brawler id.
    pub brawler_id: i32,
    /// Brawler name.
    pub brawler_name: String,
    /// Brawler power.
    pub brawler_power: i32,
    /// Brawler trophies.
    pub brawler_trophies: i32,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

impl From<BattleRow> for Battle {
    fn from(row: BattleRow) -> Self {
        Self {
            id: row.id,
            player_id: PlayerId::from_uuid(row.player_id),
            player_tag: PlayerTag::from_trusted(&row.player_tag),
            battle_time: row.battle_time,
            battle_date_time: row.battle_date_time,
            mode: row.mode,
            map: row.map,
            result: BattleResult::from_external(Some(&row.result)),
            trophy_change: row.trophy_change,
            duration: row.duration,
            is_star_player: row.is_star_player,
            brawler: BrawlerUsage {
                id: row.brawler_id,
                name: row.brawler_name,
                power: row.brawler_power,
                trophies: row.brawler_trophies,
            },
            created_at: row.created_at,
        }
    }
}

/// A row of the `player_brawlers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerBrawlerRow {
    /// Owning player.
    pub player_id: Uuid,
    /// Owning player's tag.
    pub player_tag: String,
    /// Brawler id.
    pub brawler_id: i32,
    /// Brawler name.
    pub brawler_name: String,
    /// Power level.
    pub power: i32,
    /// Rank tier.
    pub rank: i32,
    /// Trophies.
    pub trophies: i32,
    /// Highest trophies.
    pub highest_trophies: i32,
    /// Derived battle count.
    pub total_battles: i32,
    /// Derived wins.
    pub wins: i32,
    /// Derived losses.
    pub losses: i32,
    /// Derived win rate.
    pub win_rate: Decimal,
    /// Last change.
    pub last_updated: DateTime<Utc>,
}

impl From<PlayerBrawlerRow> for PlayerBrawler {
    fn from(row: PlayerBrawlerRow) -> Self {
        Self {
            player_id: PlayerId::from_uuid(row.player_id),
            player_tag: PlayerTag::from_trusted(&row.player_tag),
            brawler_id: row.brawler_id,
            brawler_name: row.brawler_name,
            power: row.power,
            rank: row.rank,
            trophies: row.trophies,
            highest_trophies: row.highest_trophies,
            total_battles: row.total_battles,
            wins: row.wins,
            losses: row.losses,
            win_rate: row.win_rate.round_dp(2),
            last_updated: row.last_updated,
        }
    }
}

/// A row of the `brawlers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrawlerRow {
    /// Catalog id.
    pub brawler_id: i32,
    /// Name.
    pub name: String,
}

impl From<BrawlerRow> for Brawler {
    fn from(row: BrawlerRow) -> Self {
        Self::new(row.brawler_id, row.name)
    }
}
