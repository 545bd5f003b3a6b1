use crate::relations::Relation;
use sqlx::SqlitePool;

const BATCH_SIZE: usize = 500;

/// Statistics from an import operation
#[derive(Debug, Default)]
pub struct ImportStats {
    /// Rows offered to the database
    pub offered: usize,
    /// Rows actually inserted (duplicates are ignored)
    pub inserted: usize,
}

fn placeholders(rows: usize, columns: usize) -> String {
    let row = format!("({})", vec!["?"; columns].join(", "));
    vec![row; rows].join(", ")
}

/// Insert words in batches with `INSERT OR IGNORE`.
pub async fn import_words<'a, I>(pool: &SqlitePool, words: I) -> Result<ImportStats, sqlx::Error>
where
    I: IntoIterator<Item = &'a String>,
{
    let words: Vec<&String> = words.into_iter().collect();
    let mut stats = ImportStats {
        offered: words.len(),
        ..ImportStats::default()
    };

    for chunk in words.chunks(BATCH_SIZE) {
        let query = format!(
            "INSERT OR IGNORE INTO words (word) VALUES {}",
            placeholders(chunk.len(), 1)
        );
        let mut q = sqlx::query(&query);
        for word in chunk {
            q = q.bind(word.as_str());
        }
        stats.inserted += q.execute(pool).await?.rows_affected() as usize;
    }

    Ok(stats)
}

/// Insert relations in batches. Rows whose words are not in the corpus are
/// kept; the server ignores them when it builds the pool.
pub async fn import_relations(
    pool: &SqlitePool,
    relations: &[Relation],
) -> Result<ImportStats, sqlx::Error> {
    let mut stats = ImportStats {
        offered: relations.len(),
        ..ImportStats::default()
    };

    for chunk in relations.chunks(BATCH_SIZE) {
        let query = format!(
            "INSERT OR IGNORE INTO word_relations (word, related, kind) VALUES {}",
            placeholders(chunk.len(), 3)
        );
        let mut q = sqlx::query(&query);
        for relation in chunk {
            q = q
                .bind(relation.word.as_str())
                .bind(relation.related.as_str())
                .bind(relation.kind.as_str());
        }
        stats.inserted += q.execute(pool).await?.rows_affected() as usize;
    }

    Ok(stats)
}
