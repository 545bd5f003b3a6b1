use super::lexicon::{Lexicon, RelationKind};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::warn;

#[derive(Clone)]
pub struct WordRepository {
    pool: SqlitePool,
}

impl WordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the whole corpus and its relations into memory.
    pub async fn load_lexicon(&self) -> Result<Lexicon, sqlx::Error> {
        let words: Vec<(String,)> = sqlx::query_as("SELECT word FROM words")
            .fetch_all(&self.pool)
            .await?;
        let mut lexicon = Lexicon::new(words.into_iter().map(|(w,)| w));

        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT word, related, kind FROM word_relations")
                .fetch_all(&self.pool)
                .await?;

        let mut grouped: HashMap<(String, RelationKind), Vec<String>> = HashMap::new();
        for (word, related, kind) in rows {
            let Some(kind) = RelationKind::parse(&kind) else {
                warn!(word = %word, kind = %kind, "Skipping relation of unknown kind");
                continue;
            };
            grouped.entry((word, kind)).or_default().push(related);
        }
        for ((word, kind), related) in grouped {
            lexicon.add_relation(&word, kind, related);
        }

        Ok(lexicon)
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
