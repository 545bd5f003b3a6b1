use super::{Profile, RatingStore};
use crate::error::StoreError;
use crate::game::rewards::{GameMode, RewardDelta};
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

#[derive(Clone)]
pub struct SqliteRatingStore {
    pool: SqlitePool,
}

impl SqliteRatingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn roll_daily(tx: &mut Transaction<'_, Sqlite>, player: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE players SET daily_rating_gain = 0, daily_date = date('now')
         WHERE player_id = ? AND daily_date <> date('now')",
    )
    .bind(player)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn read_profile(
    tx: &mut Transaction<'_, Sqlite>,
    player: &str,
    mode: GameMode,
) -> Result<Profile, sqlx::Error> {
    let row: Option<(i64, i64, i64)> = sqlx::query_as(
        "SELECT p.xp, p.daily_rating_gain, COALESCE(r.rating, 0)
         FROM players p
         LEFT JOIN ratings r ON r.player_id = p.player_id AND r.mode = ?
         WHERE p.player_id = ?",
    )
    .bind(mode.as_str())
    .bind(player)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row
        .map(|(xp, daily_rating_gain, rating)| Profile {
            xp,
            rating,
            daily_rating_gain,
        })
        .unwrap_or_default())
}

#[async_trait]
impl RatingStore for SqliteRatingStore {
    async fn profile(&self, player: &str, mode: GameMode) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;
        roll_daily(&mut tx, player).await?;
        let profile = read_profile(&mut tx, player, mode).await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn apply_reward(
        &self,
        player: &str,
        mode: GameMode,
        delta: RewardDelta,
    ) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO players (player_id) VALUES (?)")
            .bind(player)
            .execute(&mut *tx)
            .await?;
        roll_daily(&mut tx, player).await?;

        sqlx::query(
            "UPDATE players SET xp = xp + ?, daily_rating_gain = daily_rating_gain + ?
             WHERE player_id = ?",
        )
        .bind(delta.xp)
        .bind(delta.rating.max(0))
        .bind(player)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO ratings (player_id, mode, rating) VALUES (?, ?, ?)
             ON CONFLICT (player_id, mode) DO UPDATE SET rating = rating + excluded.rating",
        )
        .bind(player)
        .bind(mode.as_str())
        .bind(delta.rating)
        .execute(&mut *tx)
        .await?;

        let profile = read_profile(&mut tx, player, mode).await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn record_completion(
        &self,
        player: &str,
        mode: GameMode,
        points: i64,
        is_mvp: bool,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO game_completions (player_id, mode, points, is_mvp) VALUES (?, ?, ?, ?)")
            .bind(player)
            .bind(mode.as_str())
            .bind(points)
            .bind(is_mvp)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
