//! Shared fixtures: a scripted fetcher and record builders.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use brawl_analytics::domain::{
    Battle, Brawler, BrawlerSnapshotUpdate, BrawlerStatsUpdate, NewBattle, Player, PlayerBrawler,
    PlayerId, PlayerTag,
};
use brawl_analytics::error::AnalyticsError;
use brawl_analytics::fetch::models::{
    BattleDetails, BattleEvent, ClubRef, Participant, ParticipantBrawler, SnapshotBrawler,
};
use brawl_analytics::fetch::{BrawlerRef, ExternalBattle, Fetcher, PlayerSnapshot};
use brawl_analytics::persistence::{MemoryStorage, PlayerPage, Storage};
use brawl_analytics::service::{PlayerService, SyncSettings, seed_brawler_catalog};

/// Fetcher that replays canned responses keyed by normalized tag.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    players: Mutex<HashMap<String, PlayerSnapshot>>,
    battle_logs: Mutex<HashMap<String, Vec<ExternalBattle>>>,
    catalog: Mutex<Vec<BrawlerRef>>,
    pub player_calls: AtomicUsize,
    pub battle_log_calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_player(&self, tag: &str, snapshot: PlayerSnapshot) {
        self.players.lock().await.insert(tag.to_string(), snapshot);
    }

    pub async fn clear_player(&self, tag: &str) {
        self.players.lock().await.remove(tag);
    }

    pub async fn set_battle_log(&self, tag: &str, battles: Vec<ExternalBattle>) {
        self.battle_logs.lock().await.insert(tag.to_string(), battles);
    }

    pub async fn set_catalog(&self, catalog: Vec<BrawlerRef>) {
        *self.catalog.lock().await = catalog;
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch_player(&self, tag: &PlayerTag) -> Option<PlayerSnapshot> {
        self.player_calls.fetch_add(1, Ordering::SeqCst);
        self.players.lock().await.get(tag.as_str()).cloned()
    }

    async fn fetch_battle_log(&self, tag: &PlayerTag) -> Vec<ExternalBattle> {
        self.battle_log_calls.fetch_add(1, Ordering::SeqCst);
        self.battle_logs
            .lock()
            .await
            .get(tag.as_str())
            .cloned()
            .unwrap_or_default()
    }

    async fn fetch_brawler_catalog(&self) -> Vec<BrawlerRef> {
        self.catalog.lock().await.clone()
    }
}

/// Service over a fresh in-memory store with the fallback catalog seeded.
pub async fn service_with(fetcher: &Arc<ScriptedFetcher>) -> Arc<PlayerService> {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let dyn_fetcher: Arc<dyn Fetcher> = Arc::<ScriptedFetcher>::clone(fetcher);
    let _ = seed_brawler_catalog(dyn_fetcher.as_ref(), storage.as_ref()).await;
    Arc::new(PlayerService::new(
        dyn_fetcher,
        storage,
        SyncSettings::default(),
    ))
}

/// In-memory store whose battle writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    pub fail_battle_writes: AtomicBool,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_battle_write(&self) -> Result<(), AnalyticsError> {
        if self.fail_battle_writes.load(Ordering::SeqCst) {
            return Err(AnalyticsError::PersistenceError("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn get_player_by_tag(&self, tag: &PlayerTag) -> Result<Option<Player>, AnalyticsError> {
        self.inner.get_player_by_tag(tag).await
    }

    async fn get_player_by_id(&self, id: PlayerId) -> Result<Option<Player>, AnalyticsError> {
        self.inner.get_player_by_id(id).await
    }

    async fn player_exists(&self, tag: &PlayerTag) -> Result<bool, AnalyticsError> {
        self.inner.player_exists(tag).await
    }

    async fn insert_player(&self, player: &Player) -> Result<(), AnalyticsError> {
        self.inner.insert_player(player).await
    }

    async fn update_player(&self, player: &Player) -> Result<(), AnalyticsError> {
        self.inner.update_player(player).await
    }

    async fn list_players(&self, offset: u32, limit: u32) -> Result<PlayerPage, AnalyticsError> {
        self.inner.list_players(offset, limit).await
    }

    async fn battle_exists(
        &self,
        tag: &PlayerTag,
        battle_time: &str,
    ) -> Result<bool, AnalyticsError> {
        self.inner.battle_exists(tag, battle_time).await
    }

    async fn existing_battle_times(
        &self,
        tag: &PlayerTag,
        candidates: &[String],
    ) -> Result<HashSet<String>, AnalyticsError> {
        self.inner.existing_battle_times(tag, candidates).await
    }

    async fn insert_battle(&self, battle: &NewBattle) -> Result<bool, AnalyticsError> {
        self.check_battle_write()?;
        self.inner.insert_battle(battle).await
    }

    async fn insert_battles(&self, battles: &[NewBattle]) -> Result<u64, AnalyticsError> {
        self.check_battle_write()?;
        self.inner.insert_battles(battles).await
    }

    async fn recent_battles(
        &self,
        tag: &PlayerTag,
        limit: u32,
    ) -> Result<Vec<Battle>, AnalyticsError> {
        self.inner.recent_battles(tag, limit).await
    }

    async fn get_player_brawlers(
        &self,
        tag: &PlayerTag,
    ) -> Result<Vec<PlayerBrawler>, AnalyticsError> {
        self.inner.get_player_brawlers(tag).await
    }

    async fn upsert_brawler_snapshots(
        &self,
        updates: &[BrawlerSnapshotUpdate],
    ) -> Result<u64, AnalyticsError> {
        self.inner.upsert_brawler_snapshots(updates).await
    }

    async fn upsert_brawler_stats(
        &self,
        updates: &[BrawlerStatsUpdate],
    ) -> Result<u64, AnalyticsError> {
        self.inner.upsert_brawler_stats(updates).await
    }

    async fn get_brawler_catalog(&self) -> Result<Vec<Brawler>, AnalyticsError> {
        self.inner.get_brawler_catalog().await
    }

    async fn insert_brawlers(&self, brawlers: &[Brawler]) -> Result<u64, AnalyticsError> {
        self.inner.insert_brawlers(brawlers).await
    }
}

/// Service over the given store with the fallback catalog seeded.
pub async fn service_over(
    fetcher: &Arc<ScriptedFetcher>,
    storage: &Arc<FlakyStorage>,
) -> Arc<PlayerService> {
    let storage: Arc<dyn Storage> = Arc::<FlakyStorage>::clone(storage);
    let dyn_fetcher: Arc<dyn Fetcher> = Arc::<ScriptedFetcher>::clone(fetcher);
    let _ = seed_brawler_catalog(dyn_fetcher.as_ref(), storage.as_ref()).await;
    Arc::new(PlayerService::new(
        dyn_fetcher,
        storage,
        SyncSettings::default(),
    ))
}

pub fn snapshot(tag: &str, name: &str) -> PlayerSnapshot {
    PlayerSnapshot {
        tag: tag.to_string(),
        name: name.to_string(),
        trophies: 25_000,
        highest_trophies: 26_500,
        exp_level: 180,
        exp_points: 200_000,
        three_vs_three_victories: 8_000,
        solo_victories: 600,
        duo_victories: 700,
        club: Some(ClubRef {
            tag: "#CLUB".to_string(),
            name: "Test Club".to_string(),
        }),
        brawlers: vec![
            snapshot_brawler(16_000_000, "SHELLY", 30, 1_000),
            snapshot_brawler(16_000_001, "COLT", 22, 800),
            snapshot_brawler(99_999_999, "NOT IN CATALOG", 10, 100),
        ],
    }
}

pub fn snapshot_brawler(id: i32, name: &str, rank: i32, trophies: i32) -> SnapshotBrawler {
    SnapshotBrawler {
        id,
        name: name.to_string(),
        power: 11,
        rank,
        trophies,
        highest_trophies: trophies + 50,
    }
}

/// Compact external timestamp `minutes_ago` before 2024-11-14 12:00 UTC.
pub fn battle_time(minutes_ago: i64) -> String {
    let base = Utc
        .with_ymd_and_hms(2024, 11, 14, 12, 0, 0)
        .single()
        .unwrap_or_default();
    (base - Duration::minutes(minutes_ago))
        .format("%Y%m%dT%H%M%S.000Z")
        .to_string()
}

pub fn participant(tag: &str, brawler_id: i32, brawler_name: &str) -> Participant {
    Participant {
        tag: tag.to_string(),
        name: tag.trim_start_matches('#').to_string(),
        brawler: Some(ParticipantBrawler {
            id: brawler_id,
            name: brawler_name.to_string(),
            power: 11,
            trophies: 900,
        }),
        brawlers: Vec::new(),
    }
}

/// A 3v3 battle in which `tag` played SHELLY.
pub fn external_battle(tag: &str, time: String, result: &str) -> ExternalBattle {
    ExternalBattle {
        battle_time: time,
        event: BattleEvent {
            id: Some(15_000_026),
            mode: Some("gemGrab".to_string()),
            map: Some("Hard Rock Mine".to_string()),
        },
        battle: BattleDetails {
            mode: Some("gemGrab".to_string()),
            kind: Some("ranked".to_string()),
            result: Some(result.to_string()),
            duration: Some(140),
            trophy_change: Some(if result == "victory" { 8 } else { -6 }),
            star_player: None,
            teams: vec![
                vec![
                    participant(tag, 16_000_000, "SHELLY"),
                    participant("#ALLY1", 16_000_002, "BULL"),
                ],
                vec![participant("#FOE1", 16_000_003, "BROCK")],
            ],
            players: Vec::new(),
        },
    }
}

/// `wins` victories followed by `losses` defeats, newest first.
pub fn battle_log(tag: &str, wins: usize, losses: usize) -> Vec<ExternalBattle> {
    (0..wins + losses)
        .map(|i| {
            let result = if i < wins { "victory" } else { "defeat" };
            external_battle(tag, battle_time(i64::try_from(i).unwrap_or_default()), result)
        })
        .collect()
}
