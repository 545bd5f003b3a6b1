use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

pub const MIN_WORD_LEN: usize = 4;
pub const MAX_WORD_LEN: usize = 8;

/// Kind of lexical relation used by the synonym/antonym puzzles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Synonym,
    Antonym,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Synonym => "synonym",
            RelationKind::Antonym => "antonym",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "synonym" => Some(RelationKind::Synonym),
            "antonym" => Some(RelationKind::Antonym),
            _ => None,
        }
    }
}

/// Lowercase a raw word and keep it only if it is a 4-8 letter ASCII word.
pub fn normalize(raw: &str) -> Option<String> {
    let word = raw.trim().to_ascii_lowercase();
    let valid = (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&word.len())
        && word.bytes().all(|b| b.is_ascii_lowercase());
    valid.then_some(word)
}

/// Immutable word corpus the puzzles are generated from and answers are checked against.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: Vec<String>,
    index: HashSet<String>,
    relations: HashMap<RelationKind, HashMap<String, BTreeSet<String>>>,
}

impl Lexicon {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = words
            .into_iter()
            .filter_map(|w| normalize(w.as_ref()))
            .collect();
        let words: Vec<String> = sorted.into_iter().collect();
        let index = words.iter().cloned().collect();

        Self {
            words,
            index,
            relations: HashMap::new(),
        }
    }

    pub fn with_relation<I, S>(mut self, word: &str, kind: RelationKind, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_relation(word, kind, related);
        self
    }

    pub fn add_relation<I, S>(&mut self, word: &str, kind: RelationKind, related: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(base) = normalize(word) else { return };
        self.relations
            .entry(kind)
            .or_default()
            .entry(base)
            .or_default()
            .extend(related.into_iter().filter_map(|w| normalize(w.as_ref())));
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.words.choose(rng).map(String::as_str)
    }

    /// Related words of `word` that are themselves playable pool words.
    pub fn related_to(&self, word: &str, kind: RelationKind) -> BTreeSet<String> {
        let Some(related) = self.relations.get(&kind).and_then(|m| m.get(word)) else {
            return BTreeSet::new();
        };
        related
            .iter()
            .filter(|w| w.as_str() != word && self.contains(w))
            .cloned()
            .collect()
    }

    /// Pool words that have at least one relation of the given kind recorded.
    pub fn related_bases(&self, kind: RelationKind) -> Vec<&str> {
        let Some(bases) = self.relations.get(&kind) else {
            return Vec::new();
        };
        let mut found: Vec<&str> = bases
            .keys()
            .filter(|w| self.contains(w))
            .map(String::as_str)
            .collect();
        found.sort_unstable();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_four_to_eight_letter_alphabetic_words() {
        let lexicon = Lexicon::new(["Apple", "axe", "toolonger", "it's", "angle", "angle", " amble "]);

        assert_eq!(lexicon.words(), &["amble", "angle", "apple"]);
        assert!(lexicon.contains("apple"));
        assert!(!lexicon.contains("axe"));
    }

    #[test]
    fn related_words_are_filtered_to_the_pool() {
        let lexicon = Lexicon::new(["happy", "glad", "merry", "jolly"]).with_relation(
            "happy",
            RelationKind::Synonym,
            ["glad", "merry", "cheerful", "happy", "ok"],
        );

        let synonyms = lexicon.related_to("happy", RelationKind::Synonym);
        assert_eq!(
            synonyms.into_iter().collect::<Vec<_>>(),
            vec!["glad".to_string(), "merry".to_string()]
        );
        assert!(lexicon.related_to("happy", RelationKind::Antonym).is_empty());
        assert_eq!(lexicon.related_bases(RelationKind::Synonym), vec!["happy"]);
    }

    #[test]
    fn sampling_an_empty_pool_yields_nothing() {
        let lexicon = Lexicon::default();
        assert!(lexicon.sample(&mut rand::rng()).is_none());
    }

    #[test]
    fn relation_kind_round_trips_through_its_name() {
        for kind in [RelationKind::Synonym, RelationKind::Antonym] {
            assert_eq!(RelationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RelationKind::parse("hypernym"), None);
    }
}
