use crate::game::core::messages::RoundPhase;
use crate::game::puzzle::PuzzleSpec;
use std::time::Duration;

pub const DEFAULT_LOBBY_TIMEOUT: Duration = Duration::from_secs(120);

/// Every wait the round driver performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RushTimings {
    pub lobby_timeout: Duration,
    /// Green, yellow, red for simple constraint puzzles
    pub standard_phases: [Duration; 3],
    /// Green, yellow, red for pattern and multi-word puzzles
    pub extended_phases: [Duration; 3],
    pub round_pause: Duration,
    pub checkpoint_pause: Duration,
}

impl Default for RushTimings {
    fn default() -> Self {
        Self {
            lobby_timeout: DEFAULT_LOBBY_TIMEOUT,
            standard_phases: [
                Duration::from_secs(4),
                Duration::from_secs(3),
                Duration::from_secs(3),
            ],
            extended_phases: [
                Duration::from_secs(6),
                Duration::from_secs(5),
                Duration::from_secs(4),
            ],
            round_pause: Duration::from_secs(2),
            checkpoint_pause: Duration::from_secs(10),
        }
    }
}

impl RushTimings {
    /// Same wait everywhere except the lobby; handy for tests.
    pub fn uniform(step: Duration) -> Self {
        Self {
            lobby_timeout: DEFAULT_LOBBY_TIMEOUT,
            standard_phases: [step; 3],
            extended_phases: [step; 3],
            round_pause: step,
            checkpoint_pause: step,
        }
    }

    pub fn with_lobby_timeout(mut self, timeout: Duration) -> Self {
        self.lobby_timeout = timeout;
        self
    }

    pub fn phases(&self, puzzle: &PuzzleSpec) -> [(RoundPhase, Duration); 3] {
        let [green, yellow, red] = if puzzle.has_extended_window() {
            self.extended_phases
        } else {
            self.standard_phases
        };
        [
            (RoundPhase::Green, green),
            (RoundPhase::Yellow, yellow),
            (RoundPhase::Red, red),
        ]
    }

    pub fn round_window(&self, puzzle: &PuzzleSpec) -> Duration {
        self.phases(puzzle).iter().map(|(_, d)| *d).sum()
    }
}
