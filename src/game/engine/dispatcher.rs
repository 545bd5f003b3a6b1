use super::presenter::Presenter;
use crate::error::StoreError;
use crate::game::core::messages::{RewardLine, ServerMessage};
use crate::game::core::session::{FinalLine, Standing};
use crate::game::rewards::{self, GameMode, RewardInput, RewardOutcome};
use crate::game::store::RatingStore;
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Work queued by the round driver
#[derive(Debug)]
pub enum RewardJob {
    Checkpoint { round: u32, standings: Vec<Standing> },
    Completions { mvp: Option<String>, lines: Vec<FinalLine> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub applied: u64,
    pub failed: u64,
}

/// Per-session reward persistence: a bounded queue drained by one worker so
/// the round driver never waits on the store.
pub struct RewardDispatcher {
    tx: mpsc::Sender<RewardJob>,
    worker: JoinHandle<DispatchStats>,
}

impl RewardDispatcher {
    pub fn spawn(
        store: Arc<dyn RatingStore>,
        presenter: Arc<dyn Presenter>,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(rx, store, presenter));
        Self { tx, worker }
    }

    /// Queue a job. Waits only when the queue is full.
    pub async fn submit(&self, job: RewardJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!("Reward queue full, waiting for the worker");
                self.tx.send(job).await.is_ok()
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Reward worker gone, dropping job");
                false
            }
        }
    }

    /// Close the queue and wait until every queued job was processed.
    pub async fn close(self) -> DispatchStats {
        drop(self.tx);
        match self.worker.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Reward worker panicked");
                DispatchStats::default()
            }
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<RewardJob>,
    store: Arc<dyn RatingStore>,
    presenter: Arc<dyn Presenter>,
) -> DispatchStats {
    let mut stats = DispatchStats::default();

    while let Some(job) = rx.recv().await {
        match job {
            RewardJob::Checkpoint { round, standings } => {
                let results = join_all(
                    standings
                        .iter()
                        .map(|standing| apply_checkpoint(store.as_ref(), standing)),
                )
                .await;

                let mut rewards = Vec::with_capacity(results.len());
                for (standing, result) in standings.iter().zip(results) {
                    match result {
                        Ok(outcome) => {
                            stats.applied += 1;
                            rewards.push(RewardLine {
                                player: standing.player.clone(),
                                xp_delta: outcome.xp_delta,
                                rating_delta: outcome.rating_delta,
                                leveled_up: outcome.leveled_up,
                                tier_crossed: outcome.tier_crossed.map(|t| t.name.to_string()),
                            });
                        }
                        Err(e) => {
                            stats.failed += 1;
                            warn!(round, player = %standing.player, error = %e, "Checkpoint reward failed");
                        }
                    }
                }

                info!(round, applied = rewards.len(), "Checkpoint rewards applied");
                presenter.publish(ServerMessage::CheckpointRewards { round, rewards });
            }
            RewardJob::Completions { mvp, lines } => {
                let results = join_all(lines.iter().map(|line| {
                    let is_mvp = mvp.as_deref() == Some(line.player.as_str());
                    store.record_completion(&line.player, GameMode::Rush, line.points, is_mvp)
                }))
                .await;

                for (line, result) in lines.iter().zip(results) {
                    match result {
                        Ok(()) => stats.applied += 1,
                        Err(e) => {
                            stats.failed += 1;
                            warn!(player = %line.player, error = %e, "Recording completion failed");
                        }
                    }
                }
            }
        }
    }

    debug!(applied = stats.applied, failed = stats.failed, "Reward worker drained");
    stats
}

async fn apply_checkpoint(
    store: &dyn RatingStore,
    standing: &Standing,
) -> Result<RewardOutcome, StoreError> {
    let profile = store.profile(&standing.player, GameMode::Rush).await?;
    let input = RewardInput::checkpoint(
        standing.points,
        standing.standing,
        profile.rating,
        profile.daily_rating_gain,
    );
    let delta = rewards::compute(&input);
    store
        .apply_reward(&standing.player, GameMode::Rush, delta)
        .await?;
    Ok(RewardOutcome::from_progress(delta, profile.xp, profile.rating))
}
