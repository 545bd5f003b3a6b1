use super::dispatcher::{DEFAULT_QUEUE_CAPACITY, RewardDispatcher};
use super::presenter::Presenter;
use super::scheduler::{RoundDriver, pause};
use super::timings::RushTimings;
use crate::error::RushError;
use crate::game::core::Lexicon;
use crate::game::core::messages::ServerMessage;
use crate::game::core::round::Resolution;
use crate::game::core::session::{FinalReport, FinishReason, RushSession, SessionStatus};
use crate::game::puzzle::PuzzleGenerator;
use crate::game::store::RatingStore;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// A live rush: the session behind its lock plus the channels around it
pub struct RushHandle {
    pub channel: String,
    session: Mutex<RushSession>,
    presenter: Arc<dyn Presenter>,
    stop: watch::Sender<bool>,
}

impl RushHandle {
    fn new(channel: &str, session: RushSession, presenter: Arc<dyn Presenter>) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            channel: channel.to_string(),
            session: Mutex::new(session),
            presenter,
            stop,
        }
    }

    /// Every read or write of the session goes through this lock.
    pub fn lock(&self) -> MutexGuard<'_, RushSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, event: ServerMessage) {
        self.presenter.publish(event);
    }

    pub fn presenter(&self) -> Arc<dyn Presenter> {
        self.presenter.clone()
    }

    pub fn is_stopping(&self) -> bool {
        *self.stop.borrow()
    }

    /// Returns false if a stop was already requested.
    fn request_stop(&self) -> bool {
        !self.stop.send_replace(true)
    }

    pub(crate) fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop.subscribe()
    }
}

/// Session table: one rush per channel, each fully independent.
pub struct RushRegistry {
    sessions: DashMap<String, Arc<RushHandle>>,
    generator: PuzzleGenerator,
    store: Arc<dyn RatingStore>,
    timings: RushTimings,
    reward_queue_capacity: usize,
    rng_seed: Option<u64>,
}

impl RushRegistry {
    pub fn new(lexicon: Arc<Lexicon>, store: Arc<dyn RatingStore>) -> Self {
        Self {
            sessions: DashMap::new(),
            generator: PuzzleGenerator::new(lexicon),
            store,
            timings: RushTimings::default(),
            reward_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            rng_seed: None,
        }
    }

    pub fn with_timings(mut self, timings: RushTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_reward_queue_capacity(mut self, capacity: usize) -> Self {
        self.reward_queue_capacity = capacity;
        self
    }

    /// Deterministic puzzles and bonus rolls for every session.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn timings(&self) -> &RushTimings {
        &self.timings
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        self.generator.lexicon()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn get(&self, channel: &str) -> Option<Arc<RushHandle>> {
        self.sessions.get(channel).map(|entry| entry.clone())
    }

    fn require(&self, channel: &str) -> Result<Arc<RushHandle>, RushError> {
        self.get(channel)
            .ok_or_else(|| RushError::NotFound(channel.to_string()))
    }

    /// Open a lobby in `channel`. Fails if one is already running there.
    pub fn create(
        self: &Arc<Self>,
        channel: &str,
        host: &str,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Arc<RushHandle>, RushError> {
        let handle = match self.sessions.entry(channel.to_string()) {
            Entry::Occupied(_) => return Err(RushError::AlreadyActive(channel.to_string())),
            Entry::Vacant(slot) => {
                let handle = Arc::new(RushHandle::new(channel, RushSession::new(host), presenter));
                slot.insert(handle.clone());
                handle
            }
        };

        let session_id = handle.lock().id().to_string();
        info!(channel, host, session_id = %session_id, "Lobby created");
        handle.publish(ServerMessage::LobbyOpened {
            channel: channel.to_string(),
            host: host.to_string(),
            session_id,
        });

        self.spawn_lobby_timeout(handle.clone());
        Ok(handle)
    }

    fn spawn_lobby_timeout(self: &Arc<Self>, handle: Arc<RushHandle>) {
        let registry = self.clone();
        let mut stop = handle.subscribe_stop();
        let timeout = self.timings.lobby_timeout;

        tokio::spawn(async move {
            if !pause(&mut stop, timeout).await {
                return;
            }
            let expired = handle.lock().expire_lobby();
            if expired {
                info!(channel = %handle.channel, "Lobby expired without a start");
                handle.publish(ServerMessage::LobbyExpired);
                registry.destroy(&handle);
            }
        });
    }

    /// Remove `handle` from the table unless a newer session replaced it.
    pub fn destroy(&self, handle: &Arc<RushHandle>) -> bool {
        let removed = self
            .sessions
            .remove_if(&handle.channel, |_, current| Arc::ptr_eq(current, handle))
            .is_some();
        if removed {
            debug!(channel = %handle.channel, active = self.active_count(), "Session destroyed");
        }
        removed
    }

    /// Returns true when the player was not in the session before.
    pub fn join(&self, channel: &str, player: &str) -> Result<bool, RushError> {
        let handle = self.require(channel)?;
        if handle.is_stopping() {
            return Err(RushError::NotAccepting);
        }

        let mut session = handle.lock();
        let added = session.join(player)?;
        if added {
            info!(channel, player, "Player joined");
            handle.publish(ServerMessage::PlayerJoined {
                player: player.to_string(),
                participants: session.participant_count(),
            });
        }
        Ok(added)
    }

    /// Host confirmation: activates the session and spawns its round driver.
    pub fn confirm_start(
        self: &Arc<Self>,
        channel: &str,
        player: &str,
    ) -> Result<JoinHandle<Option<FinalReport>>, RushError> {
        let handle = self.require(channel)?;
        if handle.is_stopping() {
            return Err(RushError::NotAccepting);
        }

        let participants: Vec<String> = {
            let mut session = handle.lock();
            session.confirm_start(player)?;
            session.participants().iter().cloned().collect()
        };
        info!(channel, host = player, players = participants.len(), "Rush started");
        handle.publish(ServerMessage::RushStarted { participants });

        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let dispatcher = RewardDispatcher::spawn(
            self.store.clone(),
            handle.presenter(),
            self.reward_queue_capacity,
        );
        let driver = RoundDriver::new(
            self.clone(),
            handle,
            self.generator.clone(),
            dispatcher,
            self.timings,
            rng,
        );
        Ok(tokio::spawn(driver.run()))
    }

    /// Entry point for every candidate answer.
    pub fn submit_answer(
        &self,
        channel: &str,
        player: &str,
        answer: &str,
    ) -> Result<Resolution, RushError> {
        let handle = self.require(channel)?;
        if handle.is_stopping() {
            return Err(RushError::NotAccepting);
        }

        let mut session = handle.lock();
        if session.status() == SessionStatus::Finished {
            return Err(RushError::NotAccepting);
        }

        let resolution = session.resolve(self.lexicon(), player, answer, Instant::now());
        match &resolution {
            Resolution::Accepted { word, rank, points } => {
                debug!(channel, player, word = %word, rank, points, "Answer accepted");
                handle.publish(ServerMessage::AnswerAccepted {
                    player: player.to_string(),
                    word: word.clone(),
                    rank: *rank,
                    points: *points,
                });
            }
            Resolution::Collected { word, total } => {
                debug!(channel, player, word = %word, total, "Word collected");
                handle.publish(ServerMessage::WordCollected {
                    player: player.to_string(),
                    word: word.clone(),
                    total: *total,
                });
            }
            Resolution::Rejected(reason) => {
                debug!(channel, player, answer, ?reason, "Answer rejected");
            }
        }
        Ok(resolution)
    }

    /// Stop a rush. A lobby is torn down here; a running rush is finalized
    /// by its driver.
    pub fn stop(&self, channel: &str) -> Result<(), RushError> {
        let handle = self.require(channel)?;

        let expired = handle.lock().expire_lobby();
        let first_request = handle.request_stop();
        if expired {
            info!(channel, "Lobby stopped before starting");
            handle.publish(ServerMessage::RushEnded {
                reason: FinishReason::Stopped,
                rounds_played: 0,
                mvp: None,
                totals: Vec::new(),
            });
            self.destroy(&handle);
        } else if first_request {
            info!(channel, "Stop requested");
        } else {
            debug!(channel, "Stop already requested");
        }
        Ok(())
    }
}
