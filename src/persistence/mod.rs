//! Storage layer.
//!
//! [`Storage`] is the seam between the orchestrator and the database. Two
//! backends implement it:
//!
//! - [`PostgresStorage`] over `sqlx::PgPool`, with embedded migrations.
//! - [`MemoryStorage`], selected when persistence is disabled and used by
//!   the test suite.
//!
//! Both enforce the same uniqueness rules: one player per tag, one battle per
//! `(tag, battle_time)` (later inserts are ignored, not errors), one player
//! brawler per `(tag, brawler_id)`, one catalog entry per brawler id.

pub mod memory;
pub mod models;
pub mod postgres;

use std::collections::HashSet;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::{
    Battle, Brawler, BrawlerSnapshotUpdate, BrawlerStatsUpdate, NewBattle, Player, PlayerBrawler,
    PlayerId, PlayerTag,
};
use crate::error::AnalyticsError;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;

/// One page of tracked players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPage {
    /// Players on this page, oldest first.
    pub players: Vec<Player>,
    /// Total number of tracked players.
    pub total: u64,
}

/// Persistent state of the service.
///
/// Every method returns [`AnalyticsError::PersistenceError`] on backend
/// failure.
#[async_trait]
pub trait Storage: Send + Sync + Debug {
    /// Looks a player up by tag.
    async fn get_player_by_tag(&self, tag: &PlayerTag) -> Result<Option<Player>, AnalyticsError>;

    /// Looks a player up by internal id.
    async fn get_player_by_id(&self, id: PlayerId) -> Result<Option<Player>, AnalyticsError>;

    /// Whether a player with this tag is tracked.
    async fn player_exists(&self, tag: &PlayerTag) -> Result<bool, AnalyticsError>;

    /// Stores a new player.
    async fn insert_player(&self, player: &Player) -> Result<(), AnalyticsError>;

    /// Overwrites the mutable fields of an existing player, keyed by id.
    async fn update_player(&self, player: &Player) -> Result<(), AnalyticsError>;

    /// Lists tracked players, oldest first.
    async fn list_players(&self, offset: u32, limit: u32) -> Result<PlayerPage, AnalyticsError>;

    /// Whether a battle with this dedup key is stored.
    async fn battle_exists(&self, tag: &PlayerTag, battle_time: &str)
    -> Result<bool, AnalyticsError>;

    /// Returns the subset of `candidates` already stored for `tag`.
    async fn existing_battle_times(
        &self,
        tag: &PlayerTag,
        candidates: &[String],
    ) -> Result<HashSet<String>, AnalyticsError>;

    /// Stores one battle. Returns `false` if its dedup key already existed.
    async fn insert_battle(&self, battle: &NewBattle) -> Result<bool, AnalyticsError>;

    /// Stores battles in one batch, skipping existing dedup keys. Returns the
    /// number of rows actually inserted.
    async fn insert_battles(&self, battles: &[NewBattle]) -> Result<u64, AnalyticsError>;

    /// Most recent battles of a player, newest first.
    async fn recent_battles(&self, tag: &PlayerTag, limit: u32)
    -> Result<Vec<Battle>, AnalyticsError>;

    /// All player-brawler rows of a player, by brawler id.
    async fn get_player_brawlers(&self, tag: &PlayerTag)
    -> Result<Vec<PlayerBrawler>, AnalyticsError>;

    /// Upserts snapshot fields in one batch, leaving derived fields alone.
    async fn upsert_brawler_snapshots(
        &self,
        updates: &[BrawlerSnapshotUpdate],
    ) -> Result<u64, AnalyticsError>;

    /// Upserts derived fields in one batch, leaving snapshot fields alone.
    /// Missing rows are created with zero snapshot fields.
    async fn upsert_brawler_stats(&self, updates: &[BrawlerStatsUpdate])
    -> Result<u64, AnalyticsError>;

    /// The brawler catalog, by id.
    async fn get_brawler_catalog(&self) -> Result<Vec<Brawler>, AnalyticsError>;

    /// Adds catalog entries, ignoring ids already present. Returns the
    /// number inserted.
    async fn insert_brawlers(&self, brawlers: &[Brawler]) -> Result<u64, AnalyticsError>;
}
