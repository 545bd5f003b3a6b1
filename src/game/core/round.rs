use super::lexicon::Lexicon;
use crate::game::puzzle::{Archetype, PuzzleSpec};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

/// Points for ranks 1 to 4; every later rank earns `BASE_POINTS`
pub const RANK_POINTS: [u32; 4] = [5, 4, 3, 2];
pub const BASE_POINTS: u32 = 1;
pub const BONUS_MULTIPLIER: u32 = 3;
/// Flat award for the best performer of a multi-word round
pub const BONUS_AWARD: u32 = RANK_POINTS[0] * BONUS_MULTIPLIER;

/// Points for a 1-indexed acceptance rank.
pub fn points_for_rank(rank: usize, is_bonus: bool) -> u32 {
    let base = rank
        .checked_sub(1)
        .and_then(|i| RANK_POINTS.get(i))
        .copied()
        .unwrap_or(BASE_POINTS);
    if is_bonus { base * BONUS_MULTIPLIER } else { base }
}

/// A player's answer within one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Ranked { word: String, rank: usize, points: u32 },
    Collected { words: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    RoundNotOpen,
    NotAlphabetic,
    WrongLength,
    NotInSolutionSet,
    AlreadyUsed,
    AlreadyAnswered,
    NotAWord,
    FailsConstraint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Accepted { word: String, rank: usize, points: u32 },
    Collected { word: String, total: usize },
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusAward {
    pub player: String,
    pub points: u32,
    /// Winning word for longest-word rounds
    pub word: Option<String>,
    pub words_found: usize,
}

/// Produced once when a round closes
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub round_number: u32,
    pub puzzle: PuzzleSpec,
    pub ranked_winners: Vec<String>,
    pub is_bonus: bool,
    pub bonus_winner: Option<BonusAward>,
}

impl RoundResult {
    pub fn had_correct_answer(&self) -> bool {
        !self.ranked_winners.is_empty()
    }
}

/// The one round currently accepting answers
#[derive(Debug)]
pub struct OpenRound {
    pub number: u32,
    pub puzzle: PuzzleSpec,
    pub is_bonus: bool,
    pub opened_at: Instant,
    answers: HashMap<String, Answer>,
    winners: Vec<String>,
    /// Every collected word in arrival order, for multi-word tie-breaks
    collected: Vec<(String, String)>,
}

impl OpenRound {
    pub fn new(number: u32, puzzle: PuzzleSpec, is_bonus: bool, opened_at: Instant) -> Self {
        Self {
            number,
            puzzle,
            is_bonus,
            opened_at,
            answers: HashMap::new(),
            winners: Vec::new(),
            collected: Vec::new(),
        }
    }

    pub fn answer_of(&self, player: &str) -> Option<&Answer> {
        self.answers.get(player)
    }

    pub fn winners(&self) -> &[String] {
        &self.winners
    }

    /// Validation short of acceptance. `word` is already normalized.
    pub fn check(
        &self,
        lexicon: &Lexicon,
        used_words: &HashSet<String>,
        player: &str,
        word: &str,
    ) -> Result<(), Rejection> {
        if self.puzzle.is_multi_word {
            if !self.puzzle.is_solution(word) {
                return Err(Rejection::NotInSolutionSet);
            }
        } else if self
            .puzzle
            .expected_word_length
            .is_some_and(|len| word.len() != len)
        {
            return Err(Rejection::WrongLength);
        }

        if used_words.contains(word) {
            return Err(Rejection::AlreadyUsed);
        }
        if !self.puzzle.is_multi_word && self.answers.contains_key(player) {
            return Err(Rejection::AlreadyAnswered);
        }
        if !lexicon.contains(word) {
            return Err(Rejection::NotAWord);
        }
        if !self.puzzle.validate(word) {
            return Err(Rejection::FailsConstraint);
        }
        Ok(())
    }

    /// Record an answer that passed `check`. Returns the resolution and
    /// whether this was the player's first accepted answer this round.
    pub fn accept(&mut self, player: &str, word: &str) -> (Resolution, bool) {
        let first = !self.answers.contains_key(player);
        if first {
            self.winners.push(player.to_string());
        }

        if self.puzzle.is_multi_word {
            self.collected.push((player.to_string(), word.to_string()));
            let entry = self
                .answers
                .entry(player.to_string())
                .or_insert_with(|| Answer::Collected { words: Vec::new() });
            let total = match entry {
                Answer::Collected { words } => {
                    words.push(word.to_string());
                    words.len()
                }
                Answer::Ranked { .. } => 1,
            };
            return (
                Resolution::Collected {
                    word: word.to_string(),
                    total,
                },
                first,
            );
        }

        let rank = self.winners.len();
        let points = points_for_rank(rank, self.is_bonus);
        self.answers.insert(
            player.to_string(),
            Answer::Ranked {
                word: word.to_string(),
                rank,
                points,
            },
        );
        (
            Resolution::Accepted {
                word: word.to_string(),
                rank,
                points,
            },
            first,
        )
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.opened_at)
    }

    pub fn close(self) -> RoundResult {
        let bonus_winner = match self.puzzle.archetype {
            Archetype::LongestWord => longest_word(&self.collected),
            Archetype::MostWords => most_words(&self.collected),
            _ => None,
        };

        RoundResult {
            round_number: self.number,
            puzzle: self.puzzle,
            ranked_winners: self.winners,
            is_bonus: self.is_bonus,
            bonus_winner,
        }
    }
}

/// Strictly longer words win, so the earliest of equal length keeps the lead.
fn longest_word(collected: &[(String, String)]) -> Option<BonusAward> {
    let mut best: Option<&(String, String)> = None;
    for entry in collected {
        if best.is_none_or(|(_, word)| entry.1.len() > word.len()) {
            best = Some(entry);
        }
    }
    let (player, word) = best?;
    let words_found = collected.iter().filter(|(p, _)| p == player).count();

    Some(BonusAward {
        player: player.clone(),
        points: BONUS_AWARD,
        word: Some(word.clone()),
        words_found,
    })
}

/// The first player to reach the highest count wins ties.
fn most_words(collected: &[(String, String)]) -> Option<BonusAward> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for (player, _) in collected {
        *totals.entry(player.as_str()).or_default() += 1;
    }
    let best = totals.values().copied().max()?;

    let mut running: HashMap<&str, usize> = HashMap::new();
    for (player, _) in collected {
        let count = running.entry(player.as_str()).or_default();
        *count += 1;
        if *count == best {
            return Some(BonusAward {
                player: player.clone(),
                points: BONUS_AWARD,
                word: None,
                words_found: best,
            });
        }
    }
    None
}
