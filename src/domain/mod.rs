//! Domain layer: identities, stored entities, the analytics read model and
//! per-tag locking.
//!
//! Everything here is plain data plus small invariant-preserving helpers;
//! the metric formulas live in [`crate::metrics`] and the sync workflow in
//! [`crate::sync`] and [`crate::service`].

pub mod analytics;
pub mod battle;
pub mod brawler;
pub mod player;
pub mod player_id;
pub mod player_tag;
pub mod tag_locks;

pub use analytics::PlayerAnalytics;
pub use battle::{Battle, BattleResult, BrawlerUsage, NewBattle};
pub use brawler::Brawler;
pub use player::{BrawlerSnapshotUpdate, BrawlerStatsUpdate, Club, Player, PlayerBrawler};
pub use player_id::PlayerId;
pub use player_tag::PlayerTag;
pub use tag_locks::{TagGuard, TagLocks};
