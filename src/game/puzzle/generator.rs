use super::{Archetype, Constraint, PuzzleSpec};
use crate::game::core::{Lexicon, RelationKind};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Candidates tried before falling back to the simplest archetype
pub const MAX_ATTEMPTS: usize = 100;

const JUMBLE_RESHUFFLES: usize = 5;

/// What the round driver asks the generator for
pub struct GenerateRequest<'a> {
    pub used_types: &'a HashSet<Archetype>,
    /// Words already accepted this session
    pub used_words: &'a HashSet<String>,
    pub force_unused_type: bool,
    pub is_bonus: bool,
    pub participant_count: usize,
}

/// Pick one item from a weighted table.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(items: &'a [(T, u32)], rng: &mut R) -> Option<&'a T> {
    items
        .choose_weighted(rng, |(_, weight)| *weight)
        .ok()
        .map(|(item, _)| item)
}

/// Builds puzzles from an immutable pool. Holds no per-session state.
#[derive(Clone)]
pub struct PuzzleGenerator {
    lexicon: Arc<Lexicon>,
    max_attempts: usize,
}

impl PuzzleGenerator {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    /// Never fails: exhausting the budget degrades to a substring puzzle.
    pub fn generate<R: Rng + ?Sized>(&self, request: &GenerateRequest<'_>, rng: &mut R) -> PuzzleSpec {
        if request.is_bonus {
            if let Some(puzzle) = self.sample(&Archetype::BONUS, request, rng) {
                return puzzle;
            }
            debug!("No bonus puzzle within budget, drawing a standard one");
        }

        let table = standard_table(request);
        if let Some(puzzle) = self.sample(&table, request, rng) {
            return puzzle;
        }

        warn!(attempts = self.max_attempts, "Puzzle budget exhausted, using fallback");
        self.fallback(rng)
    }

    fn sample<R: Rng + ?Sized>(
        &self,
        table: &[(Archetype, u32)],
        request: &GenerateRequest<'_>,
        rng: &mut R,
    ) -> Option<PuzzleSpec> {
        for attempt in 0..self.max_attempts {
            let archetype = *weighted_choice(table, rng)?;
            let Some(candidate) = self.candidate(archetype, request.used_words, rng) else {
                continue;
            };
            if archetype.accepts_count(candidate.solution_count, request.participant_count) {
                debug!(
                    archetype = archetype.name(),
                    solutions = candidate.solution_count,
                    attempt,
                    "Puzzle accepted"
                );
                return Some(candidate);
            }
        }
        None
    }

    /// Build one unchecked candidate of the given archetype from a random seed word.
    pub fn candidate<R: Rng + ?Sized>(
        &self,
        archetype: Archetype,
        used_words: &HashSet<String>,
        rng: &mut R,
    ) -> Option<PuzzleSpec> {
        match archetype {
            Archetype::Substring => self.substring(rng),
            Archetype::LettersAnywhere => self.letters_anywhere(rng),
            Archetype::StartsWith => self.starts_with(rng),
            Archetype::EndsWith => self.ends_with(rng),
            Archetype::DoubleLetter => self.double_letter(rng),
            Archetype::Pattern => self.pattern(rng),
            Archetype::Rhyme => self.rhyme(rng),
            Archetype::Jumble => self.jumble(used_words, rng),
            Archetype::Synonym => self.related(RelationKind::Synonym, rng),
            Archetype::Antonym => self.related(RelationKind::Antonym, rng),
            Archetype::LongestWord | Archetype::MostWords => self.multi_word(archetype, rng),
        }
    }

    fn fixed_length(
        &self,
        archetype: Archetype,
        description: String,
        constraint: Constraint,
        length: usize,
    ) -> PuzzleSpec {
        let count = constraint.solutions(&self.lexicon, Some(length)).len();
        PuzzleSpec::new(archetype, description, constraint, Some(length), count)
    }

    fn substring<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PuzzleSpec> {
        let seed = self.lexicon.sample(rng)?;
        let size = rng.random_range(2..=3);
        let start = rng.random_range(0..=seed.len() - size);
        let fragment = &seed[start..start + size];

        Some(self.fixed_length(
            Archetype::Substring,
            format!("Word containing {} together", fragment.to_uppercase()),
            Constraint::Contains(fragment.to_string()),
            seed.len(),
        ))
    }

    fn letters_anywhere<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PuzzleSpec> {
        let seed = self.lexicon.sample(rng)?;
        let distinct: Vec<char> = seed.chars().collect::<BTreeSet<_>>().into_iter().collect();
        let size = rng.random_range(2..=3);
        if distinct.len() < size {
            return None;
        }
        let letters: Vec<char> = distinct.choose_multiple(rng, size).copied().collect();
        let listed: Vec<String> = letters.iter().map(|c| c.to_ascii_uppercase().to_string()).collect();

        Some(self.fixed_length(
            Archetype::LettersAnywhere,
            format!("Word containing {} (anywhere)", listed.join(", ")),
            Constraint::AllLetters(letters),
            seed.len(),
        ))
    }

    fn starts_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PuzzleSpec> {
        let seed = self.lexicon.sample(rng)?;
        let letter = seed.chars().next()?;
        let visual = format!("{letter}{}", "-".repeat(seed.len() - 1));

        Some(
            self.fixed_length(
                Archetype::StartsWith,
                format!("Word starting with {}", letter.to_ascii_uppercase()),
                Constraint::StartsWith(letter),
                seed.len(),
            )
            .with_visual(visual),
        )
    }

    fn ends_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PuzzleSpec> {
        let seed = self.lexicon.sample(rng)?;
        let letter = seed.chars().last()?;
        let visual = format!("{}{letter}", "-".repeat(seed.len() - 1));

        Some(
            self.fixed_length(
                Archetype::EndsWith,
                format!("Word ending with {}", letter.to_ascii_uppercase()),
                Constraint::EndsWith(letter.to_string()),
                seed.len(),
            )
            .with_visual(visual),
        )
    }

    fn double_letter<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PuzzleSpec> {
        let doubles: Vec<(char, usize)> = self
            .lexicon
            .words()
            .iter()
            .filter_map(|w| {
                let bytes = w.as_bytes();
                bytes
                    .windows(2)
                    .find(|pair| pair[0] == pair[1])
                    .map(|pair| (pair[0] as char, w.len()))
            })
            .collect();
        let &(letter, length) = doubles.choose(rng)?;

        Some(self.fixed_length(
            Archetype::DoubleLetter,
            format!("Word with double {}", letter.to_ascii_uppercase()),
            Constraint::Contains(format!("{letter}{letter}")),
            length,
        ))
    }

    fn pattern<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PuzzleSpec> {
        let seed = self.lexicon.sample(rng)?;
        let fixed = rng.random_range(1..=2);
        let letters: Vec<char> = seed.chars().collect();
        let mut slots: Vec<Option<char>> = vec![None; letters.len()];
        for pos in rand::seq::index::sample(rng, letters.len(), fixed) {
            slots[pos] = Some(letters[pos]);
        }
        let visual: String = slots.iter().map(|slot| slot.unwrap_or('-')).collect();

        Some(
            self.fixed_length(
                Archetype::Pattern,
                "Word matching pattern".to_string(),
                Constraint::Pattern(slots),
                seed.len(),
            )
            .with_visual(visual),
        )
    }

    fn rhyme<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PuzzleSpec> {
        let seed = self.lexicon.sample(rng)?;
        let size = rng.random_range(2..=3);
        let ending = &seed[seed.len() - size..];

        Some(self.fixed_length(
            Archetype::Rhyme,
            format!("Word rhyming with {}", seed.to_uppercase()),
            Constraint::EndsWith(ending.to_string()),
            seed.len(),
        ))
    }

    /// The seed is the only accepted answer, so it must still be playable.
    fn jumble<R: Rng + ?Sized>(&self, used_words: &HashSet<String>, rng: &mut R) -> Option<PuzzleSpec> {
        let seed = self.lexicon.sample(rng)?;
        if used_words.contains(seed) {
            return None;
        }
        let mut letters: Vec<char> = seed.chars().collect();
        for _ in 0..JUMBLE_RESHUFFLES {
            letters.shuffle(rng);
            if letters.iter().copied().ne(seed.chars()) {
                break;
            }
        }
        let scrambled: String = letters.into_iter().collect::<String>().to_uppercase();

        Some(
            self.fixed_length(
                Archetype::Jumble,
                format!("Unscramble: {scrambled}"),
                Constraint::anagram_of(seed),
                seed.len(),
            )
            .with_visual(scrambled),
        )
    }

    fn related<R: Rng + ?Sized>(&self, kind: RelationKind, rng: &mut R) -> Option<PuzzleSpec> {
        let bases = self.lexicon.related_bases(kind);
        let base = *bases.choose(rng)?;
        let answers = self.lexicon.related_to(base, kind);
        if answers.is_empty() {
            return None;
        }

        let (archetype, description) = match kind {
            RelationKind::Synonym => (Archetype::Synonym, format!("Word similar to {}", base.to_uppercase())),
            RelationKind::Antonym => (Archetype::Antonym, format!("Word opposite of {}", base.to_uppercase())),
        };
        let count = answers.len();
        Some(PuzzleSpec::new(
            archetype,
            description,
            Constraint::OneOf(answers),
            None,
            count,
        ))
    }

    fn multi_word<R: Rng + ?Sized>(&self, archetype: Archetype, rng: &mut R) -> Option<PuzzleSpec> {
        let seed = self.lexicon.sample(rng)?;
        let start = rng.random_range(0..=seed.len() - 2);
        let fragment = seed[start..start + 2].to_string();
        let constraint = Constraint::Contains(fragment.clone());
        let solutions: BTreeSet<String> = constraint
            .solutions(&self.lexicon, None)
            .into_iter()
            .map(str::to_string)
            .collect();

        let description = match archetype {
            Archetype::LongestWord => format!("BONUS: longest word containing {}", fragment.to_uppercase()),
            _ => format!("BONUS: most words containing {}", fragment.to_uppercase()),
        };
        let count = solutions.len();
        Some(
            PuzzleSpec::new(archetype, description, constraint, None, count)
                .with_visual(fragment.to_uppercase())
                .with_solution_set(solutions),
        )
    }

    fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> PuzzleSpec {
        let Some(seed) = self.lexicon.sample(rng) else {
            return PuzzleSpec::new(
                Archetype::Substring,
                "Word containing ER together".to_string(),
                Constraint::Contains("er".to_string()),
                Some(5),
                0,
            )
            .degraded();
        };

        let fragment = &seed[..2];
        self.fixed_length(
            Archetype::Substring,
            format!("Word containing {} together", fragment.to_uppercase()),
            Constraint::Contains(fragment.to_string()),
            seed.len(),
        )
        .degraded()
    }
}

fn standard_table(request: &GenerateRequest<'_>) -> Vec<(Archetype, u32)> {
    if request.force_unused_type {
        let unused: Vec<(Archetype, u32)> = Archetype::STANDARD
            .iter()
            .filter(|(archetype, _)| !request.used_types.contains(archetype))
            .copied()
            .collect();
        if !unused.is_empty() {
            return unused;
        }
    }
    Archetype::STANDARD.to_vec()
}
