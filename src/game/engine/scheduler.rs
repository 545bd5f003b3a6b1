use super::dispatcher::{RewardDispatcher, RewardJob};
use super::registry::{RushHandle, RushRegistry};
use super::timings::RushTimings;
use crate::game::core::messages::{CheckpointLine, FinalTotal, RoundPhase, ServerMessage};
use crate::game::core::session::{FinalReport, FinishReason, RoundPlan, Standing};
use crate::game::puzzle::{GenerateRequest, PuzzleGenerator, PuzzleSpec};
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

/// Sleep for `duration` unless a stop is requested first.
/// Returns false when stopped.
pub(crate) async fn pause(stop: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if *stop.borrow() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = stop.wait_for(|stopped| *stopped) => false,
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn checkpoint_lines(standings: &[Standing]) -> Vec<CheckpointLine> {
    standings
        .iter()
        .map(|s| CheckpointLine {
            player: s.player.clone(),
            standing: s.standing,
            points: s.points,
            rounds_won: s.rounds_won,
        })
        .collect()
}

/// Drives one active rush: round timing, checkpoints and teardown.
/// All session mutation happens under the handle's lock; the lock is never
/// held across an await.
pub struct RoundDriver {
    registry: Arc<RushRegistry>,
    handle: Arc<RushHandle>,
    generator: PuzzleGenerator,
    dispatcher: RewardDispatcher,
    timings: RushTimings,
    rng: StdRng,
    stop: watch::Receiver<bool>,
}

impl RoundDriver {
    pub(crate) fn new(
        registry: Arc<RushRegistry>,
        handle: Arc<RushHandle>,
        generator: PuzzleGenerator,
        dispatcher: RewardDispatcher,
        timings: RushTimings,
        rng: StdRng,
    ) -> Self {
        let stop = handle.subscribe_stop();
        Self {
            registry,
            handle,
            generator,
            dispatcher,
            timings,
            rng,
            stop,
        }
    }

    pub async fn run(mut self) -> Option<FinalReport> {
        let reason = self.play().await;
        self.finalize(reason).await
    }

    async fn play(&mut self) -> FinishReason {
        loop {
            if *self.stop.borrow() {
                return FinishReason::Stopped;
            }

            let Some(plan) = self.handle.lock().begin_round(&mut self.rng) else {
                return FinishReason::Victory;
            };

            if plan.checkpoint_due {
                self.checkpoint(plan.round - 1).await;
                if !pause(&mut self.stop, self.timings.checkpoint_pause).await {
                    return FinishReason::Stopped;
                }
            }

            let phases = self.open_round(&plan);
            let mut remaining: Duration = phases.iter().map(|(_, d)| *d).sum();
            for (i, (phase, duration)) in phases.into_iter().enumerate() {
                if i > 0 {
                    self.handle.publish(ServerMessage::PhaseChanged {
                        round: plan.round,
                        phase,
                        remaining_ms: as_millis(remaining),
                    });
                }
                if !pause(&mut self.stop, duration).await {
                    return FinishReason::Stopped;
                }
                remaining = remaining.saturating_sub(duration);
            }

            if self.close_round() {
                return FinishReason::Elimination;
            }
            if !pause(&mut self.stop, self.timings.round_pause).await {
                return FinishReason::Stopped;
            }
        }
    }

    /// Generate the next puzzle from a snapshot of the session, without
    /// holding its lock. No round is open here, so the snapshot stays
    /// current until `open_round`.
    fn draw_puzzle(&mut self, plan: &RoundPlan) -> PuzzleSpec {
        let (used_types, used_words, participant_count) = {
            let session = self.handle.lock();
            (
                session.used_types().clone(),
                session.used_words().clone(),
                session.participant_count(),
            )
        };
        let request = GenerateRequest {
            used_types: &used_types,
            used_words: &used_words,
            force_unused_type: plan.force_unused_type,
            is_bonus: plan.is_bonus,
            participant_count,
        };
        self.generator.generate(&request, &mut self.rng)
    }

    fn open_round(&mut self, plan: &RoundPlan) -> [(RoundPhase, Duration); 3] {
        let puzzle = self.draw_puzzle(plan);
        let phases = self.timings.phases(&puzzle);
        let mut session = self.handle.lock();

        info!(
            channel = %self.handle.channel,
            round = plan.round,
            archetype = puzzle.archetype.name(),
            solutions = puzzle.solution_count,
            is_bonus = plan.is_bonus,
            degraded = puzzle.degraded,
            "Round opened"
        );
        self.handle.publish(ServerMessage::RoundStarted {
            round: plan.round,
            description: puzzle.description.clone(),
            visual: puzzle.visual_pattern.clone(),
            is_bonus: plan.is_bonus,
            phase: RoundPhase::Green,
            remaining_ms: as_millis(self.timings.round_window(&puzzle)),
        });
        session.open_round(puzzle, Instant::now());
        phases
    }

    /// Close the open round. Returns true when the session is eliminated.
    fn close_round(&mut self) -> bool {
        let mut session = self.handle.lock();
        if let Some(result) = session.close_round() {
            debug!(
                channel = %self.handle.channel,
                round = result.round_number,
                winners = result.ranked_winners.len(),
                scoreless = session.scoreless_rounds(),
                "Round closed"
            );
            self.handle.publish(ServerMessage::RoundClosed {
                round: result.round_number,
                winners: result.ranked_winners,
                bonus_winner: result.bonus_winner,
            });
        }
        session.is_eliminated()
    }

    async fn checkpoint(&mut self, round: u32) {
        let standings = self.handle.lock().checkpoint();
        info!(channel = %self.handle.channel, round, players = standings.len(), "Checkpoint");
        self.handle.publish(ServerMessage::Checkpoint {
            round,
            standings: checkpoint_lines(&standings),
        });
        if !standings.is_empty() {
            self.dispatcher
                .submit(RewardJob::Checkpoint { round, standings })
                .await;
        }
    }

    async fn finalize(self, reason: FinishReason) -> Option<FinalReport> {
        let report = self.handle.lock().finish(reason);
        let Some(report) = report else {
            self.dispatcher.close().await;
            self.registry.destroy(&self.handle);
            return None;
        };

        info!(
            channel = %self.handle.channel,
            ?reason,
            rounds = report.rounds_played,
            mvp = ?report.mvp,
            "Rush finished"
        );

        if !report.final_checkpoint.is_empty() {
            self.handle.publish(ServerMessage::Checkpoint {
                round: report.rounds_played,
                standings: checkpoint_lines(&report.final_checkpoint),
            });
        }
        self.handle.publish(ServerMessage::RushEnded {
            reason,
            rounds_played: report.rounds_played,
            mvp: report.mvp.clone(),
            totals: report
                .lines
                .iter()
                .map(|line| FinalTotal {
                    player: line.player.clone(),
                    points: line.points,
                    rounds_won: line.rounds_won,
                    best_streak: line.best_streak,
                    fastest_ms: line.fastest.map(as_millis),
                })
                .collect(),
        });

        if !report.final_checkpoint.is_empty() {
            self.dispatcher
                .submit(RewardJob::Checkpoint {
                    round: report.rounds_played,
                    standings: report.final_checkpoint.clone(),
                })
                .await;
        }
        let completions: Vec<_> = report.completions().cloned().collect();
        if !completions.is_empty() {
            self.dispatcher
                .submit(RewardJob::Completions {
                    mvp: report.mvp.clone(),
                    lines: completions,
                })
                .await;
        }

        let stats = self.dispatcher.close().await;
        info!(
            channel = %self.handle.channel,
            applied = stats.applied,
            failed = stats.failed,
            "Rewards flushed"
        );
        self.registry.destroy(&self.handle);
        Some(report)
    }
}
