use serde_json::Value;
use std::fs;
use std::path::Path;
use wordrush::RelationKind;
use wordrush::game::core::lexicon::normalize;

/// One `word_relations` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub word: String,
    pub related: String,
    pub kind: RelationKind,
}

/// Parse a JSON lines file of
/// `{"word": "...", "synonyms": [...], "antonyms": [...]}` objects.
pub fn read_relations(path: &Path) -> Result<Vec<Relation>, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let mut relations = Vec::new();

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: Value = serde_json::from_str(line)
            .map_err(|e| format!("line {}: {e}", number + 1))?;
        relations.extend(parse_entry(&entry));
    }

    Ok(relations)
}

fn parse_entry(entry: &Value) -> Vec<Relation> {
    let Some(word) = entry.get("word").and_then(Value::as_str).and_then(normalize) else {
        return Vec::new();
    };

    let mut relations = Vec::new();
    for (field, kind) in [
        ("synonyms", RelationKind::Synonym),
        ("antonyms", RelationKind::Antonym),
    ] {
        let Some(list) = entry.get(field).and_then(Value::as_array) else {
            continue;
        };
        for related in list.iter().filter_map(Value::as_str).filter_map(normalize) {
            if related != word {
                relations.push(Relation {
                    word: word.clone(),
                    related,
                    kind,
                });
            }
        }
    }
    relations
}
