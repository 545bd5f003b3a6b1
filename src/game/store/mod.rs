mod memory;
mod sqlite;

pub use memory::{Completion, InMemoryRatingStore};
pub use sqlite::SqliteRatingStore;

use crate::error::StoreError;
use crate::game::rewards::{GameMode, RewardDelta};
use async_trait::async_trait;

/// A player's persisted progression for one mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Profile {
    pub xp: i64,
    pub rating: i64,
    /// Positive rating gained today, across modes
    pub daily_rating_gain: i64,
}

/// Persistent rating/profile store. Unknown players read as a zero profile.
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn profile(&self, player: &str, mode: GameMode) -> Result<Profile, StoreError>;

    /// Add a reward and return the profile after it was applied.
    async fn apply_reward(
        &self,
        player: &str,
        mode: GameMode,
        delta: RewardDelta,
    ) -> Result<Profile, StoreError>;

    async fn record_completion(
        &self,
        player: &str,
        mode: GameMode,
        points: i64,
        is_mvp: bool,
    ) -> Result<(), StoreError>;
}
