use crate::game::engine::{DEFAULT_LOBBY_TIMEOUT, DEFAULT_QUEUE_CAPACITY};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:wordrush.db?mode=rwc";

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub lobby_timeout: Duration,
    pub reward_queue_capacity: usize,
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: parsed("PORT").unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            lobby_timeout: parsed("LOBBY_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_LOBBY_TIMEOUT),
            reward_queue_capacity: parsed("REWARD_QUEUE_CAPACITY")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
        }
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
