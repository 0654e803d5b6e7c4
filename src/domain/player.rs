//! Tracked players and their per-brawler records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{PlayerId, PlayerTag};

/// Club affiliation copied from the latest snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Club {
    /// Club tag (`#`-prefixed).
    pub tag: String,
    /// Club display name.
    pub name: String,
}

/// A tracked player.
///
/// Created on the first successful track, refreshed on every update, never
/// deleted. Counters are overwritten from the external snapshot as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    /// Internal identifier.
    pub id: PlayerId,
    /// External tag (unique).
    pub tag: PlayerTag,
    /// Display name.
    pub name: String,
    /// Current trophies.
    pub trophies: i32,
    /// Highest trophies ever reached.
    pub highest_trophies: i32,
    /// Experience level.
    pub exp_level: i32,
    /// Experience points.
    pub exp_points: i32,
    /// 3v3 victories.
    pub victories_3v3: i32,
    /// Solo showdown victories.
    pub solo_victories: i32,
    /// Duo showdown victories.
    pub duo_victories: i32,
    /// Club affiliation, if any.
    pub club: Option<Club>,
    /// When the player was first tracked.
    pub created_at: DateTime<Utc>,
    /// When the snapshot fields were last refreshed.
    pub last_updated: DateTime<Utc>,
}

/// One player's relationship to one brawler.
///
/// `power`, `rank`, `trophies` and `highest_trophies` mirror the external
/// snapshot. `total_battles`, `wins`, `losses` and `win_rate` are derived
/// from the stored battles and only ever overwritten by a full recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerBrawler {
    /// Owning player.
    pub player_id: PlayerId,
    /// Owning player's tag.
    pub player_tag: PlayerTag,
    /// Catalog brawler id.
    pub brawler_id: i32,
    /// Brawler name.
    pub brawler_name: String,
    /// Power level.
    pub power: i32,
    /// Rank tier.
    pub rank: i32,
    /// Current brawler trophies.
    pub trophies: i32,
    /// Highest brawler trophies.
    pub highest_trophies: i32,
    /// Battles played with this brawler in the aggregation window.
    pub total_battles: i32,
    /// Victories in the aggregation window.
    pub wins: i32,
    /// Defeats in the aggregation window.
    pub losses: i32,
    /// `wins / total_battles * 100`, two decimal places.
    pub win_rate: Decimal,
    /// Last time either group of fields changed.
    pub last_updated: DateTime<Utc>,
}

/// Snapshot half of a [`PlayerBrawler`], written on track and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrawlerSnapshotUpdate {
    /// Owning player.
    pub player_id: PlayerId,
    /// Owning player's tag.
    pub player_tag: PlayerTag,
    /// Catalog brawler id.
    pub brawler_id: i32,
    /// Brawler name.
    pub brawler_name: String,
    /// Power level.
    pub power: i32,
    /// Rank tier.
    pub rank: i32,
    /// Current brawler trophies.
    pub trophies: i32,
    /// Highest brawler trophies.
    pub highest_trophies: i32,
}

/// Derived half of a [`PlayerBrawler`], produced by
/// [`crate::sync::aggregator::recompute_brawler_stats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrawlerStatsUpdate {
    /// Owning player.
    pub player_id: PlayerId,
    /// Owning player's tag.
    pub player_tag: PlayerTag,
    /// Catalog brawler id.
    pub brawler_id: i32,
    /// Brawler name, used only when the row has to be created.
    pub brawler_name: String,
    /// Battles played.
    pub total_battles: i32,
    /// Victories.
    pub wins: i32,
    /// Defeats.
    pub losses: i32,
    /// Win percentage, two decimal places.
    pub win_rate: Decimal,
}
