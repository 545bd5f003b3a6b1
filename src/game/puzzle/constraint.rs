use crate::game::core::Lexicon;
use std::collections::BTreeSet;

/// The predicate a puzzle answer has to satisfy, kept as data so it can be
/// cloned, compared and logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Letters appear together, in order (substring, double letter, bonus fragments)
    Contains(String),
    /// Every letter appears somewhere
    AllLetters(Vec<char>),
    StartsWith(char),
    /// Shared ending (ends-with letter, rhyme)
    EndsWith(String),
    /// Fixed letters at fixed positions; `None` is a free slot
    Pattern(Vec<Option<char>>),
    /// Same multiset of letters as the hidden word (letters stored sorted)
    Anagram(String),
    /// Explicit answer set (synonyms, antonyms)
    OneOf(BTreeSet<String>),
}

impl Constraint {
    pub fn anagram_of(word: &str) -> Self {
        Constraint::Anagram(sorted_letters(word))
    }

    pub fn matches(&self, word: &str) -> bool {
        match self {
            Constraint::Contains(fragment) => word.contains(fragment.as_str()),
            Constraint::AllLetters(letters) => letters.iter().all(|&c| word.contains(c)),
            Constraint::StartsWith(letter) => word.starts_with(*letter),
            Constraint::EndsWith(ending) => word.ends_with(ending.as_str()),
            Constraint::Pattern(slots) => {
                word.len() == slots.len()
                    && word
                        .chars()
                        .zip(slots)
                        .all(|(c, slot)| slot.is_none_or(|fixed| fixed == c))
            }
            Constraint::Anagram(letters) => sorted_letters(word) == *letters,
            Constraint::OneOf(answers) => answers.contains(word),
        }
    }

    /// Every pool word satisfying the constraint, optionally restricted to one length.
    /// Always a full scan so counts are exact.
    pub fn solutions<'a>(&self, lexicon: &'a Lexicon, length: Option<usize>) -> Vec<&'a str> {
        lexicon
            .words()
            .iter()
            .map(String::as_str)
            .filter(|w| length.is_none_or(|len| w.len() == len))
            .filter(|w| self.matches(w))
            .collect()
    }
}

fn sorted_letters(word: &str) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}
