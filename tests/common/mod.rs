#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use wordrush::game::rewards::{GameMode, RewardDelta};
use wordrush::game::store::{InMemoryRatingStore, Profile, RatingStore};
use wordrush::messages::{ClientMessage, ServerMessage};
use wordrush::{Lexicon, RushRegistry, RushTimings, StoreError};

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub const CHANNEL: &str = "general";

/// Every consonant-vowel-consonant-vowel word over a small alphabet, plus a
/// sprinkling of five-letter ones: large enough that puzzles never run dry.
pub fn synthetic_lexicon() -> Lexicon {
    let consonants = ['b', 'd', 'k', 'l', 'm', 'r', 's', 't'];
    let vowels = ['a', 'e', 'i', 'o', 'u'];
    let mut words = Vec::new();
    for &c1 in &consonants {
        for &v1 in &vowels {
            for &c2 in &consonants {
                for &v2 in &vowels {
                    words.push(format!("{c1}{v1}{c2}{v2}"));
                    words.push(format!("{c1}{v1}{c2}{v2}{c1}"));
                }
            }
        }
    }
    Lexicon::new(words)
}

pub fn test_registry(store: Arc<dyn RatingStore>) -> Arc<RushRegistry> {
    test_registry_with_timings(store, RushTimings::default())
}

pub fn test_registry_with_timings(
    store: Arc<dyn RatingStore>,
    timings: RushTimings,
) -> Arc<RushRegistry> {
    Arc::new(
        RushRegistry::new(Arc::new(synthetic_lexicon()), store)
            .with_timings(timings)
            .with_rng_seed(7),
    )
}

/// Up to `n` words that would be accepted in the open round right now.
pub fn unused_solutions(registry: &RushRegistry, channel: &str, n: usize) -> Vec<String> {
    let Some(handle) = registry.get(channel) else {
        return Vec::new();
    };
    let session = handle.lock();
    let Some(round) = session.current_round() else {
        return Vec::new();
    };
    let used: &HashSet<String> = session.used_words();
    registry
        .lexicon()
        .words()
        .iter()
        .filter(|w| round.puzzle.is_solution(w) && round.puzzle.validate(w) && !used.contains(*w))
        .take(n)
        .cloned()
        .collect()
}

pub fn unused_solution(registry: &RushRegistry, channel: &str) -> Option<String> {
    unused_solutions(registry, channel, 1).pop()
}

/// Refuses every call for one player, delegates the rest
pub struct FlakyStore {
    pub inner: InMemoryRatingStore,
    pub broken_player: &'static str,
}

impl FlakyStore {
    pub fn new(broken_player: &'static str) -> Self {
        Self {
            inner: InMemoryRatingStore::new(),
            broken_player,
        }
    }

    fn check(&self, player: &str) -> Result<(), StoreError> {
        if player == self.broken_player {
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RatingStore for FlakyStore {
    async fn profile(&self, player: &str, mode: GameMode) -> Result<Profile, StoreError> {
        self.check(player)?;
        self.inner.profile(player, mode).await
    }

    async fn apply_reward(
        &self,
        player: &str,
        mode: GameMode,
        delta: RewardDelta,
    ) -> Result<Profile, StoreError> {
        self.check(player)?;
        self.inner.apply_reward(player, mode, delta).await
    }

    async fn record_completion(
        &self,
        player: &str,
        mode: GameMode,
        points: i64,
        is_mvp: bool,
    ) -> Result<(), StoreError> {
        self.check(player)?;
        self.inner.record_completion(player, mode, points, is_mvp).await
    }
}

pub struct TestServer {
    base_url: String,
}

impl TestServer {
    pub fn rush_url(&self) -> String {
        format!("{}/ws/rush", self.base_url)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!(
            "http://{}{}",
            self.base_url.strip_prefix("ws://").unwrap(),
            path
        )
    }
}

pub async fn spawn_test_server(registry: Arc<RushRegistry>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let app = wordrush::app(registry);
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("ws://{}", addr),
    }
}

pub async fn connect_rush(server: &TestServer) -> WsStream {
    let (ws, _) = connect_async(&server.rush_url()).await.expect("Failed to connect");
    ws
}

fn to_message(msg: &ClientMessage) -> Message {
    let json = serde_json::to_string(msg).unwrap();
    Message::Text(json.into())
}

pub fn start_rush_msg(channel: &str, player: &str) -> Message {
    to_message(&ClientMessage::StartRush {
        channel: channel.to_string(),
        player: player.to_string(),
    })
}

pub fn join_msg(channel: &str, player: &str) -> Message {
    to_message(&ClientMessage::Join {
        channel: channel.to_string(),
        player: player.to_string(),
    })
}

pub fn confirm_msg() -> Message {
    to_message(&ClientMessage::Confirm)
}

pub fn answer_msg(answer: &str) -> Message {
    to_message(&ClientMessage::Answer {
        answer: answer.to_string(),
    })
}

pub fn stop_msg() -> Message {
    to_message(&ClientMessage::Stop)
}

pub async fn recv(ws: &mut WsStream) -> ServerMessage {
    let msg = ws.next().await.unwrap().unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

/// Skip events until one matches.
pub async fn recv_until(ws: &mut WsStream, wanted: impl Fn(&ServerMessage) -> bool) -> ServerMessage {
    loop {
        let msg = recv(ws).await;
        if wanted(&msg) {
            return msg;
        }
    }
}
