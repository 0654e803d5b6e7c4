//! PostgreSQL implementation of [`Storage`].

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::models::{BattleRow, BrawlerRow, PlayerBrawlerRow, PlayerRow};
use super::{PlayerPage, Storage};
use crate::config::AnalyticsConfig;
use crate::domain::{
    Battle, Brawler, BrawlerSnapshotUpdate, BrawlerStatsUpdate, NewBattle, Player, PlayerBrawler,
    PlayerId, PlayerTag,
};
use crate::error::AnalyticsError;

/// Rows per multi-row `INSERT`, well under the bind-parameter limit.
const BATCH_ROWS: usize = 500;

const PLAYER_COLUMNS: &str = "id, tag, name, trophies, highest_trophies, exp_level, exp_points, \
     victories_3v3, solo_victories, duo_victories, club_tag, club_name, created_at, last_updated";

const BATTLE_COLUMNS: &str = "id, player_id, player_tag, battle_time, battle_date_time, mode, map, \
     result, trophy_change, duration, is_star_player, brawler_id, brawler_name, brawler_power, \
     brawler_trophies, created_at";

const BATTLE_INSERT: &str = "INSERT INTO battles (player_id, player_tag, battle_time, \
     battle_date_time, mode, map, result, trophy_change, duration, is_star_player, brawler_id, \
     brawler_name, brawler_power, brawler_trophies) ";

const BATTLE_CONFLICT: &str = " ON CONFLICT (player_tag, battle_time) DO NOTHING";

/// PostgreSQL-backed storage using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from configuration and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`AnalyticsError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &AnalyticsConfig) -> Result<Self, AnalyticsError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let storage = Self::new(pool);
        storage.migrate().await?;
        Ok(storage)
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`AnalyticsError::PersistenceError`] on migration failure.
    pub async fn migrate(&self) -> Result<(), AnalyticsError> {
        sqlx::migrate!().run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn push_battle_values<'a>(builder: &mut QueryBuilder<'a, Postgres>, battles: &'a [NewBattle]) {
    builder.push_values(battles, |mut row, battle| {
        row.push_bind(*battle.player_id.as_uuid())
            .push_bind(battle.player_tag.as_str())
            .push_bind(battle.battle_time.as_str())
            .push_bind(battle.battle_date_time)
            .push_bind(battle.mode.as_str())
            .push_bind(battle.map.as_deref())
            .push_bind(battle.result.as_str())
            .push_bind(battle.trophy_change)
            .push_bind(battle.duration)
            .push_bind(battle.is_star_player)
            .push_bind(battle.brawler.id)
            .push_bind(battle.brawler.name.as_str())
            .push_bind(battle.brawler.power)
            .push_bind(battle.brawler.trophies);
    });
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn get_player_by_tag(&self, tag: &PlayerTag) -> Result<Option<Player>, AnalyticsError> {
        let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE tag = $1");
        let row = sqlx::query_as::<_, PlayerRow>(&sql)
            .bind(tag.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Player::from))
    }

    async fn get_player_by_id(&self, id: PlayerId) -> Result<Option<Player>, AnalyticsError> {
        let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1");
        let row = sqlx::query_as::<_, PlayerRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Player::from))
    }

    async fn player_exists(&self, tag: &PlayerTag) -> Result<bool, AnalyticsError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM players WHERE tag = $1)")
                .bind(tag.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_player(&self, player: &Player) -> Result<(), AnalyticsError> {
        sqlx::query(
            "INSERT INTO players (id, tag, name, trophies, highest_trophies, exp_level, \
             exp_points, victories_3v3, solo_victories, duo_victories, club_tag, club_name, \
             created_at, last_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(*player.id.as_uuid())
        .bind(player.tag.as_str())
        .bind(&player.name)
        .bind(player.trophies)
        .bind(player.highest_trophies)
        .bind(player.exp_level)
        .bind(player.exp_points)
        .bind(player.victories_3v3)
        .bind(player.solo_victories)
        .bind(player.duo_victories)
        .bind(player.club.as_ref().map(|c| c.tag.as_str()))
        .bind(player.club.as_ref().map(|c| c.name.as_str()))
        .bind(player.created_at)
        .bind(player.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_player(&self, player: &Player) -> Result<(), AnalyticsError> {
        let result = sqlx::query(
            "UPDATE players SET name = $2, trophies = $3, highest_trophies = $4, exp_level = $5, \
             exp_points = $6, victories_3v3 = $7, solo_victories = $8, duo_victories = $9, \
             club_tag = $10, club_name = $11, last_updated = $12 WHERE id = $1",
        )
        .bind(*player.id.as_uuid())
        .bind(&player.name)
        .bind(player.trophies)
        .bind(player.highest_trophies)
        .bind(player.exp_level)
        .bind(player.exp_points)
        .bind(player.victories_3v3)
        .bind(player.solo_victories)
        .bind(player.duo_victories)
        .bind(player.club.as_ref().map(|c| c.tag.as_str()))
        .bind(player.club.as_ref().map(|c| c.name.as_str()))
        .bind(player.last_updated)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AnalyticsError::PersistenceError(format!(
                "player {} vanished during update",
                player.tag
            )));
        }
        Ok(())
    }

    async fn list_players(&self, offset: u32, limit: u32) -> Result<PlayerPage, AnalyticsError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM players")
            .fetch_one(&self.pool)
            .await?;
        let sql = format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY created_at, tag LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, PlayerRow>(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await?;
        Ok(PlayerPage {
            players: rows.into_iter().map(Player::from).collect(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn battle_exists(
        &self,
        tag: &PlayerTag,
        battle_time: &str,
    ) -> Result<bool, AnalyticsError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM battles WHERE player_tag = $1 AND battle_time = $2)",
        )
        .bind(tag.as_str())
        .bind(battle_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn existing_battle_times(
        &self,
        tag: &PlayerTag,
        candidates: &[String],
    ) -> Result<HashSet<String>, AnalyticsError> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT battle_time FROM battles WHERE player_tag = $1 AND battle_time = ANY($2)",
        )
        .bind(tag.as_str())
        .bind(candidates)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn insert_battle(&self, battle: &NewBattle) -> Result<bool, AnalyticsError> {
        let inserted = self.insert_battles(std::slice::from_ref(battle)).await?;
        Ok(inserted == 1)
    }

    async fn insert_battles(&self, battles: &[NewBattle]) -> Result<u64, AnalyticsError> {
        if battles.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for chunk in battles.chunks(BATCH_ROWS) {
            let mut builder = QueryBuilder::<Postgres>::new(BATTLE_INSERT);
            push_battle_values(&mut builder, chunk);
            builder.push(BATTLE_CONFLICT);
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn recent_battles(
        &self,
        tag: &PlayerTag,
        limit: u32,
    ) -> Result<Vec<Battle>, AnalyticsError> {
        let sql = format!(
            "SELECT {BATTLE_COLUMNS} FROM battles WHERE player_tag = $1 \
             ORDER BY battle_date_time DESC, battle_time DESC, id DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, BattleRow>(&sql)
            .bind(tag.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Battle::from).collect())
    }

    async fn get_player_brawlers(
        &self,
        tag: &PlayerTag,
    ) -> Result<Vec<PlayerBrawler>, AnalyticsError> {
        let rows = sqlx::query_as::<_, PlayerBrawlerRow>(
            "SELECT player_id, player_tag, brawler_id, brawler_name, power, rank, trophies, \
             highest_trophies, total_battles, wins, losses, win_rate, last_updated \
             FROM player_brawlers WHERE player_tag = $1 ORDER BY brawler_id",
        )
        .bind(tag.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PlayerBrawler::from).collect())
    }

    async fn upsert_brawler_snapshots(
        &self,
        updates: &[BrawlerSnapshotUpdate],
    ) -> Result<u64, AnalyticsError> {
        if updates.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;
        for chunk in updates.chunks(BATCH_ROWS) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO player_brawlers (player_id, player_tag, brawler_id, brawler_name, \
                 power, rank, trophies, highest_trophies, last_updated) ",
            );
            builder.push_values(chunk, |mut row, update| {
                row.push_bind(*update.player_id.as_uuid())
                    .push_bind(update.player_tag.as_str())
                    .push_bind(update.brawler_id)
                    .push_bind(update.brawler_name.as_str())
                    .push_bind(update.power)
                    .push_bind(update.rank)
                    .push_bind(update.trophies)
                    .push_bind(update.highest_trophies)
                    .push_bind(now);
            });
            builder.push(
                " ON CONFLICT (player_tag, brawler_id) DO UPDATE SET \
                 brawler_name = EXCLUDED.brawler_name, power = EXCLUDED.power, \
                 rank = EXCLUDED.rank, trophies = EXCLUDED.trophies, \
                 highest_trophies = EXCLUDED.highest_trophies, \
                 last_updated = EXCLUDED.last_updated",
            );
            affected += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(affected)
    }

    async fn upsert_brawler_stats(
        &self,
        updates: &[BrawlerStatsUpdate],
    ) -> Result<u64, AnalyticsError> {
        if updates.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;
        for chunk in updates.chunks(BATCH_ROWS) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO player_brawlers (player_id, player_tag, brawler_id, brawler_name, \
                 total_battles, wins, losses, win_rate, last_updated) ",
            );
            builder.push_values(chunk, |mut row, update| {
                row.push_bind(*update.player_id.as_uuid())
                    .push_bind(update.player_tag.as_str())
                    .push_bind(update.brawler_id)
                    .push_bind(update.brawler_name.as_str())
                    .push_bind(update.total_battles)
                    .push_bind(update.wins)
                    .push_bind(update.losses)
                    .push_bind(update.win_rate)
                    .push_bind(now);
            });
            builder.push(
                " ON CONFLICT (player_tag, brawler_id) DO UPDATE SET \
                 total_battles = EXCLUDED.total_battles, wins = EXCLUDED.wins, \
                 losses = EXCLUDED.losses, win_rate = EXCLUDED.win_rate, \
                 last_updated = EXCLUDED.last_updated",
            );
            affected += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(affected)
    }

    async fn get_brawler_catalog(&self) -> Result<Vec<Brawler>, AnalyticsError> {
        let rows = sqlx::query_as::<_, BrawlerRow>(
            "SELECT brawler_id, name FROM brawlers ORDER BY brawler_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Brawler::from).collect())
    }

    async fn insert_brawlers(&self, brawlers: &[Brawler]) -> Result<u64, AnalyticsError> {
        if brawlers.is_empty() {
            return Ok(0);
        }
        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO brawlers (brawler_id, name) ");
        builder.push_values(brawlers, |mut row, brawler| {
            row.push_bind(brawler.brawler_id).push_bind(brawler.name.as_str());
        });
        builder.push(" ON CONFLICT (brawler_id) DO NOTHING");
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
