//! In-process implementation of [`Storage`].

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::{PlayerPage, Storage};
use crate::domain::{
    Battle, Brawler, BrawlerSnapshotUpdate, BrawlerStatsUpdate, NewBattle, Player, PlayerBrawler,
    PlayerId, PlayerTag,
};
use crate::error::AnalyticsError;

#[derive(Debug, Default)]
struct Tables {
    players: HashMap<PlayerTag, Player>,
    battles: Vec<Battle>,
    battle_keys: HashSet<(PlayerTag, String)>,
    next_battle_id: i64,
    player_brawlers: BTreeMap<(PlayerTag, i32), PlayerBrawler>,
    catalog: BTreeMap<i32, Brawler>,
}

impl Tables {
    fn insert_battle(&mut self, battle: &NewBattle) -> bool {
        let key = (battle.player_tag.clone(), battle.battle_time.clone());
        if !self.battle_keys.insert(key) {
            return false;
        }
        self.next_battle_id += 1;
        self.battles.push(Battle::from_new(
            self.next_battle_id,
            battle.clone(),
            Utc::now(),
        ));
        true
    }
}

/// Storage kept in process memory behind a [`tokio::sync::RwLock`].
///
/// Nothing survives a restart. Used when `PERSISTENCE_ENABLED=false` and by
/// the test suite.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_player_by_tag(&self, tag: &PlayerTag) -> Result<Option<Player>, AnalyticsError> {
        Ok(self.tables.read().await.players.get(tag).cloned())
    }

    async fn get_player_by_id(&self, id: PlayerId) -> Result<Option<Player>, AnalyticsError> {
        Ok(self
            .tables
            .read()
            .await
            .players
            .values()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn player_exists(&self, tag: &PlayerTag) -> Result<bool, AnalyticsError> {
        Ok(self.tables.read().await.players.contains_key(tag))
    }

    async fn insert_player(&self, player: &Player) -> Result<(), AnalyticsError> {
        let mut tables = self.tables.write().await;
        if tables.players.contains_key(&player.tag) {
            return Err(AnalyticsError::PersistenceError(format!(
                "player {} already exists",
                player.tag
            )));
        }
        tables.players.insert(player.tag.clone(), player.clone());
        Ok(())
    }

    async fn update_player(&self, player: &Player) -> Result<(), AnalyticsError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.players.values_mut().find(|p| p.id == player.id) else {
            return Err(AnalyticsError::PersistenceError(format!(
                "player {} vanished during update",
                player.tag
            )));
        };
        *stored = Player {
            id: stored.id,
            tag: stored.tag.clone(),
            created_at: stored.created_at,
            ..player.clone()
        };
        Ok(())
    }

    async fn list_players(&self, offset: u32, limit: u32) -> Result<PlayerPage, AnalyticsError> {
        let tables = self.tables.read().await;
        let mut players: Vec<&Player> = tables.players.values().collect();
        players.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.tag.cmp(&b.tag)));
        Ok(PlayerPage {
            total: u64::try_from(players.len()).unwrap_or(u64::MAX),
            players: players
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
        })
    }

    async fn battle_exists(
        &self,
        tag: &PlayerTag,
        battle_time: &str,
    ) -> Result<bool, AnalyticsError> {
        Ok(self
            .tables
            .read()
            .await
            .battle_keys
            .contains(&(tag.clone(), battle_time.to_string())))
    }

    async fn existing_battle_times(
        &self,
        tag: &PlayerTag,
        candidates: &[String],
    ) -> Result<HashSet<String>, AnalyticsError> {
        let tables = self.tables.read().await;
        Ok(candidates
            .iter()
            .filter(|time| tables.battle_keys.contains(&(tag.clone(), (*time).clone())))
            .cloned()
            .collect())
    }

    async fn insert_battle(&self, battle: &NewBattle) -> Result<bool, AnalyticsError> {
        Ok(self.tables.write().await.insert_battle(battle))
    }

    async fn insert_battles(&self, battles: &[NewBattle]) -> Result<u64, AnalyticsError> {
        let mut tables = self.tables.write().await;
        let inserted = battles.iter().filter(|b| tables.insert_battle(b)).count();
        Ok(u64::try_from(inserted).unwrap_or(u64::MAX))
    }

    async fn recent_battles(
        &self,
        tag: &PlayerTag,
        limit: u32,
    ) -> Result<Vec<Battle>, AnalyticsError> {
        let tables = self.tables.read().await;
        let mut battles: Vec<&Battle> = tables
            .battles
            .iter()
            .filter(|b| &b.player_tag == tag)
            .collect();
        battles.sort_by(|a, b| {
            b.battle_date_time
                .cmp(&a.battle_date_time)
                .then_with(|| b.battle_time.cmp(&a.battle_time))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(battles
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn get_player_brawlers(
        &self,
        tag: &PlayerTag,
    ) -> Result<Vec<PlayerBrawler>, AnalyticsError> {
        let tables = self.tables.read().await;
        Ok(tables
            .player_brawlers
            .range((tag.clone(), i32::MIN)..=(tag.clone(), i32::MAX))
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn upsert_brawler_snapshots(
        &self,
        updates: &[BrawlerSnapshotUpdate],
    ) -> Result<u64, AnalyticsError> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        for update in updates {
            let key = (update.player_tag.clone(), update.brawler_id);
            let row = tables.player_brawlers.entry(key).or_insert_with(|| PlayerBrawler {
                player_id: update.player_id,
                player_tag: update.player_tag.clone(),
                brawler_id: update.brawler_id,
                brawler_name: update.brawler_name.clone(),
                power: 0,
                rank: 0,
                trophies: 0,
                highest_trophies: 0,
                total_battles: 0,
                wins: 0,
                losses: 0,
                win_rate: Decimal::ZERO,
                last_updated: now,
            });
            row.brawler_name.clone_from(&update.brawler_name);
            row.power = update.power;
            row.rank = update.rank;
            row.trophies = update.trophies;
            row.highest_trophies = update.highest_trophies;
            row.last_updated = now;
        }
        Ok(u64::try_from(updates.len()).unwrap_or(u64::MAX))
    }

    async fn upsert_brawler_stats(
        &self,
        updates: &[BrawlerStatsUpdate],
    ) -> Result<u64, AnalyticsError> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        for update in updates {
            let key = (update.player_tag.clone(), update.brawler_id);
            let row = tables.player_brawlers.entry(key).or_insert_with(|| PlayerBrawler {
                player_id: update.player_id,
                player_tag: update.player_tag.clone(),
                brawler_id: update.brawler_id,
                brawler_name: update.brawler_name.clone(),
                power: 0,
                rank: 0,
                trophies: 0,
                highest_trophies: 0,
                total_battles: 0,
                wins: 0,
                losses: 0,
                win_rate: Decimal::ZERO,
                last_updated: now,
            });
            row.total_battles = update.total_battles;
            row.wins = update.wins;
            row.losses = update.losses;
            row.win_rate = update.win_rate;
            row.last_updated = now;
        }
        Ok(u64::try_from(updates.len()).unwrap_or(u64::MAX))
    }

    async fn get_brawler_catalog(&self) -> Result<Vec<Brawler>, AnalyticsError> {
        Ok(self.tables.read().await.catalog.values().cloned().collect())
    }

    async fn insert_brawlers(&self, brawlers: &[Brawler]) -> Result<u64, AnalyticsError> {
        let mut tables = self.tables.write().await;
        let mut inserted = 0;
        for brawler in brawlers {
            if !tables.catalog.contains_key(&brawler.brawler_id) {
                tables.catalog.insert(brawler.brawler_id, brawler.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;
    use crate::domain::{BattleResult, BrawlerUsage};
    use crate::metrics::test_support::base_time;

    fn player(tag: &str) -> Player {
        Player {
            id: PlayerId::new(),
            tag: PlayerTag::from_trusted(tag),
            name: "Tester".to_string(),
            trophies: 100,
            highest_trophies: 120,
            exp_level: 10,
            exp_points: 1000,
            victories_3v3: 5,
            solo_victories: 1,
            duo_victories: 2,
            club: None,
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    fn new_battle(owner: &Player, time: &str, minutes_ago: i64) -> NewBattle {
        NewBattle {
            player_id: owner.id,
            player_tag: owner.tag.clone(),
            battle_time: time.to_string(),
            battle_date_time: base_time() - chrono::Duration::minutes(minutes_ago),
            mode: "gemGrab".to_string(),
            map: None,
            result: BattleResult::Victory,
            trophy_change: Some(8),
            duration: Some(100),
            is_star_player: false,
            brawler: BrawlerUsage::unknown(),
        }
    }

    #[tokio::test]
    async fn duplicate_battles_are_ignored() {
        let store = MemoryStorage::new();
        let owner = player("#AAA");
        assert_ok!(store.insert_player(&owner).await);

        let batch = vec![new_battle(&owner, "t1", 1), new_battle(&owner, "t2", 0)];
        let first = store.insert_battles(&batch).await;
        assert_eq!(first.ok(), Some(2));
        let second = store.insert_battles(&batch).await;
        assert_eq!(second.ok(), Some(0));
        assert_eq!(store.insert_battle(&new_battle(&owner, "t1", 1)).await.ok(), Some(false));

        let existing = store
            .existing_battle_times(&owner.tag, &["t1".to_string(), "t3".to_string()])
            .await;
        let Ok(existing) = existing else {
            panic!("lookup should succeed");
        };
        assert!(existing.contains("t1"));
        assert!(!existing.contains("t3"));
    }

    #[tokio::test]
    async fn recent_battles_are_newest_first_and_limited() {
        let store = MemoryStorage::new();
        let owner = player("#AAA");
        let batch = vec![
            new_battle(&owner, "old", 30),
            new_battle(&owner, "new", 0),
            new_battle(&owner, "mid", 10),
        ];
        assert_ok!(store.insert_battles(&batch).await);

        let Ok(recent) = store.recent_battles(&owner.tag, 2).await else {
            panic!("query should succeed");
        };
        let times: Vec<&str> = recent.iter().map(|b| b.battle_time.as_str()).collect();
        assert_eq!(times, vec!["new", "mid"]);
    }

    #[tokio::test]
    async fn duplicate_player_tag_is_rejected() {
        let store = MemoryStorage::new();
        assert_ok!(store.insert_player(&player("#AAA")).await);
        assert!(store.insert_player(&player("#AAA")).await.is_err());
    }

    #[tokio::test]
    async fn stats_upsert_keeps_snapshot_fields() {
        let store = MemoryStorage::new();
        let owner = player("#AAA");
        let snapshot = BrawlerSnapshotUpdate {
            player_id: owner.id,
            player_tag: owner.tag.clone(),
            brawler_id: 16_000_000,
            brawler_name: "SHELLY".to_string(),
            power: 11,
            rank: 30,
            trophies: 1000,
            highest_trophies: 1100,
        };
        assert_ok!(store.upsert_brawler_snapshots(&[snapshot]).await);

        let stats = BrawlerStatsUpdate {
            player_id: owner.id,
            player_tag: owner.tag.clone(),
            brawler_id: 16_000_000,
            brawler_name: "ignored".to_string(),
            total_battles: 4,
            wins: 3,
            losses: 1,
            win_rate: Decimal::new(7500, 2),
        };
        assert_ok!(store.upsert_brawler_stats(&[stats]).await);

        let Ok(rows) = store.get_player_brawlers(&owner.tag).await else {
            panic!("query should succeed");
        };
        let Some(row) = rows.first() else {
            panic!("row expected");
        };
        assert_eq!(row.power, 11);
        assert_eq!(row.rank, 30);
        assert_eq!(row.brawler_name, "SHELLY");
        assert_eq!((row.total_battles, row.wins, row.losses), (4, 3, 1));
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let store = MemoryStorage::new();
        let original = player("#AAA");
        assert_ok!(store.insert_player(&original).await);

        let mut changed = original.clone();
        changed.name = "Renamed".to_string();
        changed.trophies = 999;
        assert_ok!(store.update_player(&changed).await);

        let Ok(Some(stored)) = store.get_player_by_id(original.id).await else {
            panic!("player expected");
        };
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.trophies, 999);
        assert_eq!(stored.created_at, original.created_at);
    }

    #[tokio::test]
    async fn catalog_insert_ignores_existing_ids() {
        let store = MemoryStorage::new();
        let first = store.insert_brawlers(&[Brawler::new(1, "A"), Brawler::new(2, "B")]).await;
        assert_eq!(first.ok(), Some(2));
        let second = store.insert_brawlers(&[Brawler::new(2, "B2"), Brawler::new(3, "C")]).await;
        assert_eq!(second.ok(), Some(1));

        let Ok(catalog) = store.get_brawler_catalog().await else {
            panic!("query should succeed");
        };
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(1).map(|b| b.name.as_str()), Some("B"));
    }

    #[tokio::test]
    async fn list_players_pages() {
        let store = MemoryStorage::new();
        for tag in ["#A1", "#A2", "#A3"] {
            assert_ok!(store.insert_player(&player(tag)).await);
        }
        let Ok(page) = store.list_players(1, 1).await else {
            panic!("query should succeed");
        };
        assert_eq!(page.total, 3);
        assert_eq!(page.players.len(), 1);
    }
}
