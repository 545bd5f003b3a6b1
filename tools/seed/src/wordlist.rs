use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use wordrush::game::core::lexicon::normalize;
use zip::ZipArchive;

/// Words read from a list, before and after the pool filter
#[derive(Debug, Default)]
pub struct WordList {
    pub words: BTreeSet<String>,
    pub rejected: usize,
}

impl WordList {
    /// One word per line. Blank lines and `#` comments are skipped, anything
    /// the pool would not accept is counted as rejected.
    pub fn extend_from_text(&mut self, contents: &str) {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match normalize(line) {
                Some(word) => {
                    self.words.insert(word);
                }
                None => self.rejected += 1,
            }
        }
    }
}

/// Read a plain text word list, or every `.txt` file inside a `.zip` bundle.
pub fn read_words(path: &Path) -> Result<WordList, Box<dyn std::error::Error>> {
    let mut list = WordList::default();

    let is_zip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if !is_zip {
        list.extend_from_text(&fs::read_to_string(path)?);
        return Ok(list);
    }

    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    let names: Vec<String> = (0..archive.len())
        .filter_map(|i| {
            let file = archive.by_index(i).ok()?;
            let name = file.name().to_string();
            name.ends_with(".txt").then_some(name)
        })
        .collect();

    for name in names {
        let mut file = archive.by_name(&name)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        list.extend_from_text(&contents);
    }

    Ok(list)
}
