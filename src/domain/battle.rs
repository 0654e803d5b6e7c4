//! Stored battles.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PlayerId, PlayerTag};

/// Outcome of a battle from the tracked player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    /// The player's side won.
    Victory,
    /// The player's side lost.
    Defeat,
    /// Draw, showdown placement, or anything not reported as a win or loss.
    Draw,
}

impl BattleResult {
    /// Maps the external result string. Only `"victory"` and `"defeat"`
    /// (any case) are recognized; everything else is a draw.
    #[must_use]
    pub fn from_external(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("victory") => Self::Victory,
            Some(s) if s.eq_ignore_ascii_case("defeat") => Self::Defeat,
            _ => Self::Draw,
        }
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::Draw => "draw",
        }
    }
}

impl fmt::Display for BattleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which brawler the player used, as recorded at battle time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BrawlerUsage {
    /// Catalog id, `0` when the player was not found in the rosters.
    pub id: i32,
    /// Brawler name, `"Unknown"` when not found.
    pub name: String,
    /// Power level at battle time.
    pub power: i32,
    /// Brawler trophies at battle time.
    pub trophies: i32,
}

impl BrawlerUsage {
    /// Placeholder used when the player's roster entry is missing.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            id: 0,
            name: "Unknown".to_string(),
            power: 0,
            trophies: 0,
        }
    }
}

/// A battle ready to be stored, produced by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBattle {
    /// Owning player.
    pub player_id: PlayerId,
    /// Owning player's tag; with `battle_time` this is the dedup key.
    pub player_tag: PlayerTag,
    /// Raw external timestamp string.
    pub battle_time: String,
    /// Parsed timestamp (processing time when unparseable).
    pub battle_date_time: DateTime<Utc>,
    /// Game mode.
    pub mode: String,
    /// Map name.
    pub map: Option<String>,
    /// Outcome.
    pub result: BattleResult,
    /// Trophy delta, when the mode reports one.
    pub trophy_change: Option<i32>,
    /// Duration in seconds.
    pub duration: Option<i32>,
    /// Whether the player was star player.
    pub is_star_player: bool,
    /// Brawler used.
    pub brawler: BrawlerUsage,
}

/// A stored battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Battle {
    /// Storage row id.
    pub id: i64,
    /// Owning player.
    pub player_id: PlayerId,
    /// Owning player's tag.
    pub player_tag: PlayerTag,
    /// Raw external timestamp string.
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
    /// Whether the player was star player.
    pub is_star_player: bool,
    /// Brawler used.
    pub brawler: BrawlerUsage,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

impl Battle {
    /// Materializes a [`NewBattle`] once storage has assigned an id.
    #[must_use]
    pub fn from_new(id: i64, battle: NewBattle, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            player_id: battle.player_id,
            player_tag: battle.player_tag,
            battle_time: battle.battle_time,
            battle_date_time: battle.battle_date_time,
            mode: battle.mode,
            map: battle.map,
            result: battle.result,
            trophy_change: battle.trophy_change,
            duration: battle.duration,
            is_star_player: battle.is_star_player,
            brawler: battle.brawler,
            created_at,
        }
    }
}
