use super::{Profile, RatingStore};
use crate::error::StoreError;
use crate::game::rewards::{GameMode, RewardDelta};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub player: String,
    pub mode: GameMode,
    pub points: i64,
    pub is_mvp: bool,
}

#[derive(Debug, Default)]
struct PlayerRecord {
    xp: i64,
    daily_rating_gain: i64,
    ratings: HashMap<GameMode, i64>,
}

impl PlayerRecord {
    fn profile(&self, mode: GameMode) -> Profile {
        Profile {
            xp: self.xp,
            rating: self.ratings.get(&mode).copied().unwrap_or(0),
            daily_rating_gain: self.daily_rating_gain,
        }
    }
}

/// Process-local store for tests and runs without a database. Daily gain never resets.
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    players: DashMap<String, PlayerRecord>,
    completions: Mutex<Vec<Completion>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a player's rating, e.g. to test tier scaling.
    pub fn set_rating(&self, player: &str, mode: GameMode, rating: i64) {
        self.players
            .entry(player.to_string())
            .or_default()
            .ratings
            .insert(mode, rating);
    }

    pub fn completions(&self) -> Vec<Completion> {
        self.completions
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn profile(&self, player: &str, mode: GameMode) -> Result<Profile, StoreError> {
        Ok(self
            .players
            .get(player)
            .map(|record| record.profile(mode))
            .unwrap_or_default())
    }

    async fn apply_reward(
        &self,
        player: &str,
        mode: GameMode,
        delta: RewardDelta,
    ) -> Result<Profile, StoreError> {
        let mut record = self.players.entry(player.to_string()).or_default();
        record.xp += delta.xp;
        record.daily_rating_gain += delta.rating.max(0);
        *record.ratings.entry(mode).or_insert(0) += delta.rating;
        Ok(record.profile(mode))
    }

    async fn record_completion(
        &self,
        player: &str,
        mode: GameMode,
        points: i64,
        is_mvp: bool,
    ) -> Result<(), StoreError> {
        let mut completions = self
            .completions
            .lock()
            .map_err(|_| StoreError::Unavailable("completion log poisoned".into()))?;
        completions.push(Completion {
            player: player.to_string(),
            mode,
            points,
            is_mvp,
        });
        Ok(())
    }
}
