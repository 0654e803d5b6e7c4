//! Player, battle and catalog DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::PaginationMeta;
use crate::domain::{Battle, BattleResult, Brawler, BrawlerUsage, Player};

/// Default number of battles returned by the battles endpoint.
pub const DEFAULT_BATTLES_LIMIT: u32 = 10;

/// Upper bound for the battles endpoint's `limit`.
pub const MAX_BATTLES_LIMIT: u32 = 100;

/// `POST /players/track` request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TrackPlayerRequest {
    /// Player tag, with or without the leading `#`.
    #[serde(alias = "playerTag")]
    pub player_tag: String,
}

/// `POST /players/track` response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrackPlayerResponse {
    /// Human-readable summary.
    pub message: String,
    /// Normalized tag.
    pub player_tag: String,
    /// Stored battles among the ten most recent.
    pub battles_found: usize,
}

/// `POST /players/{tag}/update` response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdatePlayerResponse {
    /// Human-readable summary.
    pub message: String,
    /// Normalized tag.
    pub player_tag: String,
    /// Stored battles among the ten most recent.
    pub battles_count: usize,
}

/// Query parameters of the battles endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct BattlesQuery {
    /// Number of battles (default 10, max 100).
    pub limit: Option<u32>,
}

impl BattlesQuery {
    /// Effective limit within `1..=100`.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_BATTLES_LIMIT)
            .clamp(1, MAX_BATTLES_LIMIT)
    }
}

/// One stored battle.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BattleDto {
    /// Raw external timestamp.
    pub battle_time: String,
    /// Parsed timestamp.
    pub battle_date_time: DateTime<Utc>,
    /// Game mode.
    pub mode: String,
    /// Map name.
    pub map: Option<String>,
    /// Outcome.
    pub result: BattleResult,
    /// Trophy delta.
    pub trophy_change: Option<i32>,
    /// Duration in seconds.
    pub duration: Option<i32>,
    /// Star player flag.
    pub is_star_player: bool,
    /// Brawler used.
    pub brawler: BrawlerUsage,
}

impl From<Battle> for BattleDto {
    fn from(battle: Battle) -> Self {
        Self {
            battle_time: battle.battle_time,
            battle_date_time: battle.battle_date_time,
            mode: battle.mode,
            map: battle.map,
            result: battle.result,
            trophy_change: battle.trophy_change,
            duration: battle.duration,
            is_star_player: battle.is_star_player,
            brawler: battle.brawler,
        }
    }
}

/// `GET /players/{tag}/battles` response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentBattlesResponse {
    /// Normalized tag.
    pub player_tag: String,
    /// Number of battles returned.
    pub total_battles: usize,
    /// Battles, newest first.
    pub battles: Vec<BattleDto>,
}

/// Summary of a tracked player for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSummaryDto {
    /// Tag.
    pub tag: String,
    /// Display name.
    pub name: String,
    /// Current trophies.
    pub trophies: i32,
    /// Highest trophies.
    pub highest_trophies: i32,
    /// Experience level.
    pub exp_level: i32,
    /// Club name, if any.
    pub club_name: Option<String>,
    /// First tracked.
    pub created_at: DateTime<Utc>,
    /// Last refresh.
    pub last_updated: DateTime<Utc>,
}

impl From<Player> for PlayerSummaryDto {
    fn from(player: Player) -> Self {
        Self {
            tag: player.tag.to_string(),
            name: player.name,
            trophies: player.trophies,
            highest_trophies: player.highest_trophies,
            exp_level: player.exp_level,
            club_name: player.club.map(|c| c.name),
            created_at: player.created_at,
            last_updated: player.last_updated,
        }
    }
}

/// `GET /players` response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerListResponse {
    /// Players on this page.
    pub players: Vec<PlayerSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// `GET /brawlers` response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BrawlerCatalogResponse {
    /// Number of entries.
    pub total: usize,
    /// Entries by id.
    pub brawlers: Vec<Brawler>,
}
