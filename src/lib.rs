pub mod config;
pub mod error;
pub mod game;

pub use error::{RushError, StoreError};
pub use game::messages;
pub use game::{Lexicon, RelationKind, RushRegistry, RushState, RushTimings, WordRepository};

use axum::{
    Router,
    extract::{State, WebSocketUpgrade, ws::WebSocket},
    http::{Method, header},
    response::Response,
    routing::get,
};
use game::store::{RatingStore, SqliteRatingStore};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

async fn health() -> &'static str {
    "ok"
}

#[derive(Clone)]
pub struct AppState {
    pub rush: Arc<RushState>,
}

async fn rush_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_rush_socket(socket, state))
}

async fn handle_rush_socket(socket: WebSocket, state: AppState) {
    game::run_connection(socket, state.rush).await;
}

/// Router over an already built registry.
pub fn app(registry: Arc<RushRegistry>) -> Router {
    let state = AppState {
        rush: Arc::new(RushState::new(registry)),
    };

    Router::new()
        .route("/health", get(health))
        .route("/ws/rush", get(rush_handler))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(Any),
        )
        .with_state(state)
}

/// Load the lexicon from `pool`, persist rewards to the same database.
pub async fn app_with_config(
    pool: SqlitePool,
    timings: RushTimings,
    reward_queue_capacity: usize,
) -> Result<Router, sqlx::Error> {
    let words = WordRepository::new(pool.clone());
    let lexicon = words.load_lexicon().await?;
    tracing::info!(playable = lexicon.len(), stored = words.count().await?, "Lexicon loaded");

    let store: Arc<dyn RatingStore> = Arc::new(SqliteRatingStore::new(pool));
    let registry = RushRegistry::new(Arc::new(lexicon), store)
        .with_timings(timings)
        .with_reward_queue_capacity(reward_queue_capacity);
    Ok(app(Arc::new(registry)))
}
