use sqlx::SqlitePool;
use wordrush::game::rewards::{GameMode, RewardDelta};
use wordrush::game::store::{Profile, RatingStore, SqliteRatingStore};
use wordrush::{RelationKind, RushTimings, WordRepository};

async fn seed_words(pool: &SqlitePool, words: &[&str]) {
    for word in words {
        sqlx::query("INSERT INTO words (word) VALUES (?)")
            .bind(word)
            .execute(pool)
            .await
            .unwrap();
    }
}

#[sqlx::test]
async fn migrations_create_empty_tables(pool: SqlitePool) {
    for table in ["words", "word_relations", "players", "ratings", "game_completions"] {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{table}");
    }
}

#[sqlx::test]
async fn lexicon_loads_words_and_relations(pool: SqlitePool) {
    seed_words(&pool, &["happy", "glad", "cheerful", "sad", "joyful"]).await;
    for (related, kind) in [
        ("glad", "synonym"),
        ("joyful", "synonym"),
        ("sad", "antonym"),
        ("elated", "synonym"),
    ] {
        sqlx::query("INSERT INTO word_relations (word, related, kind) VALUES ('happy', ?, ?)")
            .bind(related)
            .bind(kind)
            .execute(&pool)
            .await
            .unwrap();
    }

    let repo = WordRepository::new(pool);
    let lexicon = repo.load_lexicon().await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 5);
    // "sad" is too short to play
    assert_eq!(lexicon.len(), 4);
    assert!(lexicon.contains("cheerful"));
    assert!(!lexicon.contains("sad"));

    let synonyms: Vec<String> = lexicon
        .related_to("happy", RelationKind::Synonym)
        .into_iter()
        .collect();
    assert_eq!(synonyms, ["glad", "joyful"]);
    assert!(lexicon.related_to("happy", RelationKind::Antonym).is_empty());
}

#[sqlx::test]
async fn app_builds_from_a_seeded_database(pool: SqlitePool) {
    seed_words(&pool, &["apple", "ample", "sad"]).await;

    let app = wordrush::app_with_config(pool, RushTimings::default(), 8).await;

    assert!(app.is_ok());
}

#[sqlx::test]
async fn unknown_player_has_a_zero_profile(pool: SqlitePool) {
    let store = SqliteRatingStore::new(pool);

    let profile = store.profile("ghost", GameMode::Rush).await.unwrap();

    assert_eq!(profile, Profile::default());
}

#[sqlx::test]
async fn rewards_accumulate_per_mode(pool: SqlitePool) {
    let store = SqliteRatingStore::new(pool);

    store
        .apply_reward("amy", GameMode::Rush, RewardDelta { xp: 40, rating: 16 })
        .await
        .unwrap();
    let after = store
        .apply_reward("amy", GameMode::Rush, RewardDelta { xp: 10, rating: -5 })
        .await
        .unwrap();

    // A loss lowers the rating but not today's gain
    assert_eq!(
        after,
        Profile {
            xp: 50,
            rating: 11,
            daily_rating_gain: 16
        }
    );

    let multi = store.profile("amy", GameMode::Multi).await.unwrap();
    assert_eq!(multi.rating, 0);
    assert_eq!(multi.xp, 50);
}

#[sqlx::test]
async fn daily_gain_resets_on_a_new_day(pool: SqlitePool) {
    let store = SqliteRatingStore::new(pool.clone());
    store
        .apply_reward("amy", GameMode::Rush, RewardDelta { xp: 10, rating: 300 })
        .await
        .unwrap();

    sqlx::query("UPDATE players SET daily_date = date('now', '-1 day') WHERE player_id = 'amy'")
        .execute(&pool)
        .await
        .unwrap();

    let profile = store.profile("amy", GameMode::Rush).await.unwrap();
    assert_eq!(profile.daily_rating_gain, 0);
    assert_eq!(profile.rating, 300);
}

#[sqlx::test]
async fn completions_are_recorded(pool: SqlitePool) {
    let store = SqliteRatingStore::new(pool.clone());

    store
        .record_completion("amy", GameMode::Rush, 42, true)
        .await
        .unwrap();
    store
        .record_completion("bob", GameMode::Rush, 7, false)
        .await
        .unwrap();

    let rows: Vec<(String, String, i64, bool)> = sqlx::query_as(
        "SELECT player_id, mode, points, is_mvp FROM game_completions ORDER BY id",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(
        rows,
        [
            ("amy".to_string(), "rush".to_string(), 42, true),
            ("bob".to_string(), "rush".to_string(), 7, false),
        ]
    );
}
