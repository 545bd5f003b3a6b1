mod importer;
mod relations;
mod wordlist;

use clap::Parser;
use importer::{import_relations, import_words};
use sqlx::SqlitePool;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seed", about = "Seed the word rush database with a word corpus")]
struct Args {
    /// Word list: one word per line, or a ZIP of .txt lists
    #[arg(short, long)]
    words: PathBuf,

    /// Synonym/antonym relations as JSON lines (optional)
    #[arg(short, long)]
    relations: Option<PathBuf>,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Clear existing words and relations before import
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Connecting to database...");
    let pool = SqlitePool::connect(&args.database_url).await?;

    // Run migrations to ensure schema exists
    sqlx::migrate!("../../migrations").run(&pool).await?;

    if args.clear {
        println!("Clearing existing words...");
        sqlx::query("DELETE FROM word_relations").execute(&pool).await?;
        sqlx::query("DELETE FROM words").execute(&pool).await?;
    }

    println!("Reading word list: {:?}", args.words);
    let list = wordlist::read_words(&args.words)?;
    println!(
        "Found {} playable words ({} rejected)",
        list.words.len(),
        list.rejected
    );

    let words = import_words(&pool, &list.words).await?;

    let relations = match &args.relations {
        Some(path) => {
            println!("Reading relations: {:?}", path);
            let relations = relations::read_relations(path)?;
            Some(import_relations(&pool, &relations).await?)
        }
        None => None,
    };

    println!();
    println!("Import complete:");
    println!("  Words inserted:     {} of {}", words.inserted, words.offered);
    if let Some(relations) = relations {
        println!(
            "  Relations inserted: {} of {}",
            relations.inserted, relations.offered
        );
    }

    Ok(())
}
