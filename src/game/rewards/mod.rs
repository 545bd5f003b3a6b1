//! Pure reward calculation: base tables, tier scaling and anti-grind decay.

mod tiers;

pub use tiers::{TIERS, Tier, level_for_xp, level_progress, tier_crossed, tier_for, tier_multiplier};

use serde::{Deserialize, Serialize};

/// Daily rating gain at which rewards are halved
pub const DAILY_CAP_1: i64 = 500;
/// Daily rating gain at which rewards drop to a quarter
pub const DAILY_CAP_2: i64 = 700;

const SPEED_FAST_SECS: f64 = 60.0;
const SPEED_SLOW_SECS: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Solo,
    Multi,
    Rush,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Solo => "solo",
            GameMode::Multi => "multi",
            GameMode::Rush => "rush",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    /// Partial correctness: number of correct letters, 1 to 4
    Correct(u8),
    Participation,
    /// Rush checkpoint: points accumulated since the last checkpoint and the
    /// 0-based position in the checkpoint ranking
    Checkpoint { points: i64, standing: usize },
}

/// Everything the calculator needs about one finished game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardInput {
    pub mode: GameMode,
    pub outcome: Outcome,
    pub guesses: u32,
    pub elapsed_secs: f64,
    pub current_rating: i64,
    pub daily_rating_gain: i64,
}

impl RewardInput {
    pub fn checkpoint(points: i64, standing: usize, current_rating: i64, daily_rating_gain: i64) -> Self {
        Self {
            mode: GameMode::Rush,
            outcome: Outcome::Checkpoint { points, standing },
            guesses: 0,
            elapsed_secs: 0.0,
            current_rating,
            daily_rating_gain,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewardDelta {
    pub xp: i64,
    pub rating: i64,
}

fn efficiency_bonus(guesses: u32) -> i64 {
    match guesses {
        1 => 50,
        2 => 40,
        3 => 30,
        4 => 20,
        5 => 10,
        6 => 5,
        _ => 0,
    }
}

fn speed_rating_bonus(elapsed_secs: f64) -> i64 {
    if elapsed_secs < SPEED_FAST_SECS {
        20
    } else if elapsed_secs < SPEED_SLOW_SECS {
        10
    } else {
        0
    }
}

fn speed_xp_bonus(elapsed_secs: f64) -> i64 {
    if elapsed_secs < SPEED_FAST_SECS {
        10
    } else if elapsed_secs < SPEED_SLOW_SECS {
        5
    } else {
        0
    }
}

fn multi_base(outcome: Outcome) -> (i64, i64) {
    match outcome {
        Outcome::Win => (50, 60),
        Outcome::Correct(4) => (40, 35),
        Outcome::Correct(3) => (30, 25),
        Outcome::Correct(2) => (20, 10),
        Outcome::Correct(1) => (10, 5),
        Outcome::Participation => (5, 2),
        _ => (5, 0),
    }
}

/// Rewards before tier and anti-grind scaling.
pub fn base_rewards(input: &RewardInput) -> RewardDelta {
    if let Outcome::Checkpoint { points, standing } = input.outcome {
        let rank_bonus = 25_i64.saturating_sub(5 * standing as i64).max(0);
        return RewardDelta {
            xp: 25 + rank_bonus,
            rating: points,
        };
    }

    match input.mode {
        GameMode::Solo => match input.outcome {
            Outcome::Win => RewardDelta {
                xp: 40,
                rating: 100 + efficiency_bonus(input.guesses) + speed_rating_bonus(input.elapsed_secs),
            },
            Outcome::Loss => RewardDelta { xp: 5, rating: -15 },
            _ => RewardDelta { xp: 5, rating: -15 },
        },
        GameMode::Multi | GameMode::Rush => {
            let (mut xp, mut rating) = multi_base(input.outcome);
            if input.outcome == Outcome::Win {
                rating += efficiency_bonus(input.guesses) + speed_rating_bonus(input.elapsed_secs);
                xp += speed_xp_bonus(input.elapsed_secs);
            }
            RewardDelta { xp, rating }
        }
    }
}

/// 0.5 past the first cap, 0.25 past the second. The second replaces the first.
pub fn anti_grind_multiplier(daily_rating_gain: i64) -> f64 {
    let daily = daily_rating_gain.max(0);
    if daily >= DAILY_CAP_2 {
        0.25
    } else if daily >= DAILY_CAP_1 {
        0.5
    } else {
        1.0
    }
}

fn scale(value: i64, factor: f64) -> i64 {
    (value as f64 * factor) as i64
}

/// Full pipeline. Values are truncated after each scaling step; negative
/// rating deltas are never scaled.
pub fn compute(input: &RewardInput) -> RewardDelta {
    let base = base_rewards(input);

    let tier = tier_multiplier(input.current_rating);
    let mut xp = scale(base.xp, tier);
    let mut rating = base.rating;
    if rating > 0 {
        rating = scale(rating, tier);
    }

    let grind = anti_grind_multiplier(input.daily_rating_gain);
    xp = scale(xp, grind);
    if rating > 0 {
        rating = scale(rating, grind);
    }

    RewardDelta { xp, rating }
}

/// A computed reward with the progression changes it causes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardOutcome {
    pub xp_delta: i64,
    pub rating_delta: i64,
    pub leveled_up: Option<u32>,
    pub tier_crossed: Option<&'static Tier>,
}

impl RewardOutcome {
    /// Compare the totals before and after applying `delta`.
    pub fn from_progress(delta: RewardDelta, xp_before: i64, rating_before: i64) -> Self {
        let level_before = level_for_xp(xp_before);
        let level_after = level_for_xp(xp_before + delta.xp);

        Self {
            xp_delta: delta.xp,
            rating_delta: delta.rating,
            leveled_up: (level_after > level_before).then_some(level_after),
            tier_crossed: tier_crossed(rating_before, rating_before + delta.rating),
        }
    }
}
