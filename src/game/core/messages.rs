use super::round::{BonusAward, Rejection};
use super::session::FinishReason;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    // Lobby
    StartRush { channel: String, player: String },
    Join { channel: String, player: String },
    Confirm,

    // Running rush
    Answer { answer: String },
    Stop,
}

/// Traffic light shown while a round is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointLine {
    pub player: String,
    pub standing: usize,
    pub points: i64,
    pub rounds_won: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardLine {
    pub player: String,
    pub xp_delta: i64,
    pub rating_delta: i64,
    pub leveled_up: Option<u32>,
    pub tier_crossed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalTotal {
    pub player: String,
    pub points: i64,
    pub rounds_won: u32,
    pub best_streak: u32,
    pub fastest_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    // Lobby
    LobbyOpened {
        channel: String,
        host: String,
        session_id: String,
    },
    PlayerJoined {
        player: String,
        participants: usize,
    },
    LobbyExpired,
    RushStarted {
        participants: Vec<String>,
    },

    // Round flow
    RoundStarted {
        round: u32,
        description: String,
        visual: Option<String>,
        is_bonus: bool,
        phase: RoundPhase,
        remaining_ms: u64,
    },
    PhaseChanged {
        round: u32,
        phase: RoundPhase,
        remaining_ms: u64,
    },
    AnswerAccepted {
        player: String,
        word: String,
        rank: usize,
        points: u32,
    },
    WordCollected {
        player: String,
        word: String,
        total: usize,
    },
    AnswerRejected {
        reason: Rejection,
    },
    RoundClosed {
        round: u32,
        winners: Vec<String>,
        bonus_winner: Option<BonusAward>,
    },

    // Checkpoints and the end
    Checkpoint {
        round: u32,
        standings: Vec<CheckpointLine>,
    },
    CheckpointRewards {
        round: u32,
        rewards: Vec<RewardLine>,
    },
    RushEnded {
        reason: FinishReason,
        rounds_played: u32,
        mvp: Option<String>,
        totals: Vec<FinalTotal>,
    },
    Error {
        message: String,
    },
}
