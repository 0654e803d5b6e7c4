//! Player service: tracking, synchronization and analytics.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::domain::{
    Battle, Brawler, BrawlerSnapshotUpdate, Player, PlayerAnalytics, PlayerId, PlayerTag, TagLocks,
};
use crate::error::AnalyticsError;
use crate::fetch::{Fetcher, PlayerSnapshot};
use crate::metrics::build_analytics;
use crate::persistence::{PlayerPage, Storage};
use crate::sync::{reconcile, recompute_brawler_stats};

/// Battle windows used by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Most recent battles the analytics view covers.
    pub analytics_battle_window: u32,
    /// Most recent battles brawler stats are recomputed over.
    pub aggregation_battle_window: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            analytics_battle_window: 100,
            aggregation_battle_window: 1000,
        }
    }
}

impl From<&AnalyticsConfig> for SyncSettings {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            analytics_battle_window: config.analytics_battle_window,
            aggregation_battle_window: config.aggregation_battle_window,
        }
    }
}

/// Counters of one battle sync, logged at info level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records returned by the battle log.
    pub fetched: usize,
    /// Records already stored.
    pub skipped_existing: usize,
    /// Records repeated inside the fetched batch.
    pub skipped_duplicate: usize,
    /// Battles written.
    pub inserted: u64,
    /// Player-brawler rows whose counters were recomputed.
    pub brawlers_recomputed: u64,
}

/// Orchestration layer for everything that touches a player.
///
/// Stateless coordinator over a [`Fetcher`] and a [`Storage`]. Track and
/// sync calls for one tag are serialized through [`TagLocks`]; calls for
/// different tags proceed concurrently. Analytics reads take no lock.
#[derive(Debug)]
pub struct PlayerService {
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn Storage>,
    locks: TagLocks,
    settings: SyncSettings,
}

impl PlayerService {
    /// Creates a new `PlayerService`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, storage: Arc<dyn Storage>, settings: SyncSettings) -> Self {
        Self {
            fetcher,
            storage,
            locks: TagLocks::new(),
            settings,
        }
    }

    /// Returns the storage backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Starts tracking a player. Returns `false` on any failure, which is
    /// logged.
    pub async fn track(&self, tag: &PlayerTag) -> bool {
        match self.track_player(tag).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(%tag, error = %e, "track failed");
                false
            }
        }
    }

    /// Starts tracking a player, or refreshes it if it is already tracked.
    ///
    /// A refresh that finds no upstream snapshot keeps the stored data and
    /// succeeds with an empty report.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::PlayerUnavailable`] if the external API has no
    ///   snapshot for a new player; nothing is written in that case.
    /// - [`AnalyticsError::PlayerNotFound`] if a tracked player disappears
    ///   during the refresh.
    /// - [`AnalyticsError::PersistenceError`] on storage failure, including
    ///   during a refresh.
    pub async fn track_player(&self, tag: &PlayerTag) -> Result<SyncReport, AnalyticsError> {
        let _guard = self.locks.acquire(tag).await;

        if self.storage.player_exists(tag).await? {
            tracing::info!(%tag, "player already tracked, refreshing");
            return match self.sync_unlocked(tag).await {
                Err(AnalyticsError::PlayerUnavailable(_)) => {
                    tracing::info!(%tag, "no upstream snapshot, keeping stored data");
                    Ok(SyncReport::default())
                }
                other => other,
            };
        }

        let Some(snapshot) = self.fetcher.fetch_player(tag).await else {
            tracing::warn!(%tag, "player unavailable upstream, not tracked");
            return Err(AnalyticsError::PlayerUnavailable(tag.to_string()));
        };

        let now = Utc::now();
        let player = player_from_snapshot(PlayerId::new(), tag, &snapshot, now, now);
        self.storage
            .insert_player(&player)
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "insert_player", error = %e, "track failed"))?;
        tracing::info!(%tag, player_id = %player.id, name = %player.name, "player tracked");

        self.refresh_brawler_snapshots(&player, &snapshot).await?;
        self.sync_battles(&player).await
    }

    /// Refreshes a tracked player. Best effort: failures are logged with
    /// the tag and the failing step, never returned.
    pub async fn update(&self, tag: &PlayerTag) {
        match self.sync_player(tag).await {
            Ok(report) => tracing::debug!(%tag, ?report, "update finished"),
            Err(e) => tracing::warn!(%tag, error = %e, "update failed"),
        }
    }

    /// Refreshes a tracked player and reports what changed.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::PlayerUnavailable`] if the external API has no
    ///   snapshot.
    /// - [`AnalyticsError::PlayerNotFound`] if the player is not tracked.
    /// - [`AnalyticsError::PersistenceError`] on storage failure.
    pub async fn sync_player(&self, tag: &PlayerTag) -> Result<SyncReport, AnalyticsError> {
        let _guard = self.locks.acquire(tag).await;
        self.sync_unlocked(tag).await
    }

    async fn sync_unlocked(&self, tag: &PlayerTag) -> Result<SyncReport, AnalyticsError> {
        let Some(snapshot) = self.fetcher.fetch_player(tag).await else {
            tracing::warn!(%tag, step = "fetch_player", "no snapshot, update skipped");
            return Err(AnalyticsError::PlayerUnavailable(tag.to_string()));
        };

        let stored = self
            .storage
            .get_player_by_tag(tag)
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "load_player", error = %e, "update failed"))?;
        let Some(stored) = stored else {
            tracing::warn!(%tag, step = "load_player", "player not tracked, update skipped");
            return Err(AnalyticsError::PlayerNotFound(tag.to_string()));
        };

        let player = player_from_snapshot(stored.id, tag, &snapshot, stored.created_at, Utc::now());
        self.storage
            .update_player(&player)
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "update_player", error = %e, "update failed"))?;

        self.refresh_brawler_snapshots(&player, &snapshot).await?;
        self.sync_battles(&player).await
    }

    async fn known_brawler_ids(&self) -> Result<HashSet<i32>, AnalyticsError> {
        Ok(self
            .storage
            .get_brawler_catalog()
            .await?
            .into_iter()
            .map(|b| b.brawler_id)
            .collect())
    }

    async fn refresh_brawler_snapshots(
        &self,
        player: &Player,
        snapshot: &PlayerSnapshot,
    ) -> Result<u64, AnalyticsError> {
        let known = self
            .known_brawler_ids()
            .await
            .inspect_err(|e| tracing::error!(tag = %player.tag, step = "load_catalog", error = %e, "sync failed"))?;
        let mut updates: BTreeMap<i32, BrawlerSnapshotUpdate> = BTreeMap::new();
        for brawler in &snapshot.brawlers {
            if !known.contains(&brawler.id) {
                tracing::warn!(tag = %player.tag, brawler_id = brawler.id, name = %brawler.name, "brawler missing from catalog, skipped");
                continue;
            }
            updates.insert(
                brawler.id,
                BrawlerSnapshotUpdate {
                    player_id: player.id,
                    player_tag: player.tag.clone(),
                    brawler_id: brawler.id,
                    brawler_name: brawler.name.clone(),
                    power: brawler.power,
                    rank: brawler.rank,
                    trophies: brawler.trophies,
                    highest_trophies: brawler.highest_trophies,
                },
            );
        }
        let updates: Vec<BrawlerSnapshotUpdate> = updates.into_values().collect();
        self.storage
            .upsert_brawler_snapshots(&updates)
            .await
            .inspect_err(|e| tracing::error!(tag = %player.tag, step = "brawler_snapshots", error = %e, "sync failed"))
    }

    /// Fetches the battle log, stores what is new and, if anything was
    /// stored, recomputes brawler stats.
    async fn sync_battles(&self, player: &Player) -> Result<SyncReport, AnalyticsError> {
        let tag = &player.tag;
        let records = self.fetcher.fetch_battle_log(tag).await;
        let candidates: Vec<String> = records.iter().map(|r| r.battle_time.clone()).collect();

        let existing = self
            .storage
            .existing_battle_times(tag, &candidates)
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "existing_battles", error = %e, "sync failed"))?;

        let outcome = reconcile(player.id, tag, &existing, &records, Utc::now());
        let inserted = self
            .storage
            .insert_battles(&outcome.new_battles)
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "insert_battles", error = %e, "sync failed"))?;

        let mut report = SyncReport {
            fetched: records.len(),
            skipped_existing: outcome.skipped_existing,
            skipped_duplicate: outcome.skipped_duplicate,
            inserted,
            brawlers_recomputed: 0,
        };
        if inserted > 0 {
            report.brawlers_recomputed = self.recompute_stats(player).await?;
        }

        tracing::info!(
            %tag,
            fetched = report.fetched,
            inserted = report.inserted,
            skipped_existing = report.skipped_existing,
            skipped_duplicate = report.skipped_duplicate,
            brawlers_recomputed = report.brawlers_recomputed,
            "battle sync finished"
        );
        Ok(report)
    }

    async fn recompute_stats(&self, player: &Player) -> Result<u64, AnalyticsError> {
        let tag = &player.tag;
        let battles = self
            .storage
            .recent_battles(tag, self.settings.aggregation_battle_window)
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "load_battles", error = %e, "sync failed"))?;
        let existing = self
            .storage
            .get_player_brawlers(tag)
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "load_player_brawlers", error = %e, "sync failed"))?;
        let known = self
            .known_brawler_ids()
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "load_catalog", error = %e, "sync failed"))?;

        let (updates, dropped): (Vec<_>, Vec<_>) =
            recompute_brawler_stats(player.id, tag, &existing, &battles)
                .into_iter()
                .partition(|u| known.contains(&u.brawler_id));
        for update in &dropped {
            tracing::debug!(%tag, brawler_id = update.brawler_id, "no catalog entry, stats not stored");
        }

        self.storage
            .upsert_brawler_stats(&updates)
            .await
            .inspect_err(|e| tracing::error!(%tag, step = "brawler_stats", error = %e, "sync failed"))
    }

    /// Builds the analytics view of a tracked player.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::PlayerNotFound`] if the player is not tracked.
    /// - [`AnalyticsError::PersistenceError`] on storage failure.
    pub async fn analytics(&self, tag: &PlayerTag) -> Result<PlayerAnalytics, AnalyticsError> {
        let player = self.require_player(tag).await?;
        let battles = self
            .storage
            .recent_battles(tag, self.settings.analytics_battle_window)
            .await?;
        let brawlers = self.storage.get_player_brawlers(tag).await?;
        Ok(build_analytics(&player, &battles, &brawlers))
    }

    /// Most recent stored battles of a tracked player, newest first.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::PlayerNotFound`] if the player is not tracked.
    /// - [`AnalyticsError::PersistenceError`] on storage failure.
    pub async fn recent_battles(
        &self,
        tag: &PlayerTag,
        limit: u32,
    ) -> Result<Vec<Battle>, AnalyticsError> {
        self.require_player(tag).await?;
        self.storage.recent_battles(tag, limit).await
    }

    /// One page of tracked players.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] on storage failure.
    pub async fn list_players(&self, offset: u32, limit: u32) -> Result<PlayerPage, AnalyticsError> {
        self.storage.list_players(offset, limit).await
    }

    /// The brawler catalog.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] on storage failure.
    pub async fn brawler_catalog(&self) -> Result<Vec<Brawler>, AnalyticsError> {
        self.storage.get_brawler_catalog().await
    }

    /// Whether a player is tracked.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] on storage failure.
    pub async fn is_tracked(&self, tag: &PlayerTag) -> Result<bool, AnalyticsError> {
        self.storage.player_exists(tag).await
    }

    async fn require_player(&self, tag: &PlayerTag) -> Result<Player, AnalyticsError> {
        self.storage
            .get_player_by_tag(tag)
            .await?
            .ok_or_else(|| AnalyticsError::PlayerNotFound(tag.to_string()))
    }
}

fn player_from_snapshot(
    id: PlayerId,
    tag: &PlayerTag,
    snapshot: &PlayerSnapshot,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
) -> Player {
    Player {
        id,
        tag: tag.clone(),
        name: snapshot.name.clone(),
        trophies: snapshot.trophies,
        highest_trophies: snapshot.highest_trophies,
        exp_level: snapshot.exp_level,
        exp_points: snapshot.exp_points,
        victories_3v3: snapshot.three_vs_three_victories,
        solo_victories: snapshot.solo_victories,
        duo_victories: snapshot.duo_victories,
        club: snapshot.club(),
        created_at,
        last_updated,
    }
}
