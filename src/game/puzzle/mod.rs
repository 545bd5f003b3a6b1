mod constraint;
mod generator;

pub use constraint::Constraint;
pub use generator::{GenerateRequest, MAX_ATTEMPTS, PuzzleGenerator, weighted_choice};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Accepted solution-count bounds for standard single-answer puzzles
pub const MIN_SOLUTIONS: usize = 5;
pub const MAX_SOLUTIONS: usize = 20;

/// Multi-word bonus puzzles need room for every participant
pub const BONUS_SOLUTIONS_PER_PLAYER: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Substring,
    LettersAnywhere,
    StartsWith,
    EndsWith,
    DoubleLetter,
    Pattern,
    Rhyme,
    Jumble,
    Synonym,
    Antonym,
    LongestWord,
    MostWords,
}

impl Archetype {
    /// Standard archetypes with their relative sampling weights
    pub const STANDARD: [(Archetype, u32); 10] = [
        (Archetype::Substring, 12),
        (Archetype::LettersAnywhere, 10),
        (Archetype::EndsWith, 10),
        (Archetype::StartsWith, 8),
        (Archetype::DoubleLetter, 8),
        (Archetype::Pattern, 12),
        (Archetype::Rhyme, 12),
        (Archetype::Jumble, 15),
        (Archetype::Synonym, 6),
        (Archetype::Antonym, 6),
    ];

    /// Multi-word archetypes, only drawn for bonus rounds
    pub const BONUS: [(Archetype, u32); 2] = [(Archetype::LongestWord, 1), (Archetype::MostWords, 1)];

    pub fn is_multi_word(self) -> bool {
        matches!(self, Archetype::LongestWord | Archetype::MostWords)
    }

    /// Whether a candidate with `count` solutions is an acceptable puzzle.
    pub fn accepts_count(self, count: usize, participants: usize) -> bool {
        match self {
            Archetype::Jumble => count == 1,
            Archetype::LongestWord | Archetype::MostWords => {
                count >= MIN_SOLUTIONS.max(BONUS_SOLUTIONS_PER_PLAYER * participants)
            }
            _ => (MIN_SOLUTIONS..=MAX_SOLUTIONS).contains(&count),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Substring => "substring",
            Archetype::LettersAnywhere => "letters_anywhere",
            Archetype::StartsWith => "starts_with",
            Archetype::EndsWith => "ends_with",
            Archetype::DoubleLetter => "double_letter",
            Archetype::Pattern => "pattern",
            Archetype::Rhyme => "rhyme",
            Archetype::Jumble => "jumble",
            Archetype::Synonym => "synonym",
            Archetype::Antonym => "antonym",
            Archetype::LongestWord => "longest_word",
            Archetype::MostWords => "most_words",
        }
    }
}

/// A generated puzzle. Immutable once built; lives for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleSpec {
    pub archetype: Archetype,
    pub description: String,
    pub constraint: Constraint,
    /// Full answer set, exposed only for multi-word puzzles
    pub solution_set: Option<BTreeSet<String>>,
    pub visual_pattern: Option<String>,
    /// `None` when answers may have any pool length
    pub expected_word_length: Option<usize>,
    pub is_multi_word: bool,
    pub is_five_letter_only: bool,
    pub solution_count: usize,
    /// Built by the fallback path rather than accepted against its bound
    pub degraded: bool,
}

impl PuzzleSpec {
    pub(crate) fn new(
        archetype: Archetype,
        description: String,
        constraint: Constraint,
        expected_word_length: Option<usize>,
        solution_count: usize,
    ) -> Self {
        Self {
            archetype,
            description,
            constraint,
            solution_set: None,
            visual_pattern: None,
            expected_word_length,
            is_multi_word: archetype.is_multi_word(),
            is_five_letter_only: expected_word_length == Some(5),
            solution_count,
            degraded: false,
        }
    }

    pub(crate) fn with_visual(mut self, visual: impl Into<String>) -> Self {
        self.visual_pattern = Some(visual.into());
        self
    }

    pub(crate) fn with_solution_set(mut self, solutions: BTreeSet<String>) -> Self {
        self.solution_set = Some(solutions);
        self
    }

    pub(crate) fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }

    /// The validator predicate: length (when fixed) and constraint.
    pub fn validate(&self, word: &str) -> bool {
        self.expected_word_length.is_none_or(|len| word.len() == len)
            && self.constraint.matches(word)
    }

    pub fn is_solution(&self, word: &str) -> bool {
        match &self.solution_set {
            Some(solutions) => solutions.contains(word),
            None => self.validate(word),
        }
    }

    /// Pattern and multi-word puzzles get the longer answer window
    pub fn has_extended_window(&self) -> bool {
        self.is_multi_word || self.archetype == Archetype::Pattern
    }
}
