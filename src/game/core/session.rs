use super::lexicon::Lexicon;
use super::round::{OpenRound, Rejection, Resolution, RoundResult};
use crate::error::RushError;
use crate::game::puzzle::{Archetype, PuzzleSpec};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

pub const MAX_ROUNDS: u32 = 100;
pub const CHECKPOINT_INTERVAL: u32 = 12;
pub const MAX_SCORELESS_ROUNDS: u32 = 4;
pub const FORCE_VARIETY_INTERVAL: u32 = 20;
/// Distinct standard archetypes after which the variety tracker restarts
pub const ARCHETYPE_ROTATION: usize = 10;
pub const BONUS_GUARANTEE_ROUND: u32 = 19;
pub const BONUS_MIN_GAP: u32 = 14;
pub const BONUS_CHANCE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Lobby,
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Victory,
    Elimination,
    Stopped,
}

/// Points accumulated since the last checkpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub points: i64,
    pub rounds_won: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub streak: u32,
    pub best_streak: u32,
    pub fastest: Option<Duration>,
}

/// What the driver should do for the round it just advanced to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPlan {
    pub round: u32,
    pub is_bonus: bool,
    pub checkpoint_due: bool,
    pub force_unused_type: bool,
}

/// One line of a checkpoint ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub player: String,
    pub standing: usize,
    pub points: i64,
    pub rounds_won: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalLine {
    pub player: String,
    pub points: i64,
    pub rounds_won: u32,
    pub best_streak: u32,
    pub fastest: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalReport {
    pub reason: FinishReason,
    pub rounds_played: u32,
    pub final_checkpoint: Vec<Standing>,
    /// Highest lifetime points first
    pub lines: Vec<FinalLine>,
    pub mvp: Option<String>,
}

impl FinalReport {
    /// Players owed a completion record: positive lifetime score only.
    pub fn completions(&self) -> impl Iterator<Item = &FinalLine> {
        self.lines.iter().filter(|line| line.points > 0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    score: Score,
    /// Order of first score this checkpoint window
    first_seen: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Lifetime {
    points: i64,
    rounds_won: u32,
    /// When the current total was reached
    reached_at: u64,
}

/// Rush session state (pure logic, no I/O). Callers serialize access.
#[derive(Debug)]
pub struct RushSession {
    id: String,
    host: String,
    participants: BTreeSet<String>,
    status: SessionStatus,
    round_number: u32,
    rounds_played: u32,
    used_words: HashSet<String>,
    puzzle_type_history: HashSet<Archetype>,
    rounds_without_correct: u32,
    rounds_since_last_bonus: u32,
    had_bonus: bool,
    is_bonus_round: bool,
    accumulated: HashMap<String, Tally>,
    lifetime: HashMap<String, Lifetime>,
    stats: HashMap<String, PlayerStats>,
    current: Option<OpenRound>,
    sequence: u64,
}

impl RushSession {
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            participants: BTreeSet::from([host.clone()]),
            host,
            status: SessionStatus::Lobby,
            round_number: 0,
            rounds_played: 0,
            used_words: HashSet::new(),
            puzzle_type_history: HashSet::new(),
            rounds_without_correct: 0,
            rounds_since_last_bonus: 0,
            had_bonus: false,
            is_bonus_round: false,
            accumulated: HashMap::new(),
            lifetime: HashMap::new(),
            stats: HashMap::new(),
            current: None,
            sequence: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn participants(&self) -> &BTreeSet<String> {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn used_words(&self) -> &HashSet<String> {
        &self.used_words
    }

    pub fn used_types(&self) -> &HashSet<Archetype> {
        &self.puzzle_type_history
    }

    pub fn is_bonus_round(&self) -> bool {
        self.is_bonus_round
    }

    pub fn current_round(&self) -> Option<&OpenRound> {
        self.current.as_ref()
    }

    pub fn stats(&self, player: &str) -> Option<&PlayerStats> {
        self.stats.get(player)
    }

    pub fn accumulated_scores(&self) -> HashMap<String, Score> {
        self.accumulated
            .iter()
            .map(|(player, tally)| (player.clone(), tally.score))
            .collect()
    }

    pub fn lifetime_scores(&self) -> HashMap<String, i64> {
        self.lifetime
            .iter()
            .map(|(player, total)| (player.clone(), total.points))
            .collect()
    }

    pub fn scoreless_rounds(&self) -> u32 {
        self.rounds_without_correct
    }

    pub fn is_eliminated(&self) -> bool {
        self.rounds_without_correct >= MAX_SCORELESS_ROUNDS
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Add a player. Returns false when they were already in.
    pub fn join(&mut self, player: &str) -> Result<bool, RushError> {
        if self.status == SessionStatus::Finished {
            return Err(RushError::NotAccepting);
        }
        Ok(self.participants.insert(player.to_string()))
    }

    pub fn confirm_start(&mut self, player: &str) -> Result<(), RushError> {
        match self.status {
            SessionStatus::Finished => return Err(RushError::NotAccepting),
            SessionStatus::Active => return Err(RushError::AlreadyStarted),
            SessionStatus::Lobby => {}
        }
        if player != self.host {
            return Err(RushError::NotHost);
        }
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Lobby never confirmed. Returns true if this call ended it.
    pub fn expire_lobby(&mut self) -> bool {
        if self.status != SessionStatus::Lobby {
            return false;
        }
        self.status = SessionStatus::Finished;
        true
    }

    /// Advance to the next round and decide its bonus, checkpoint and variety
    /// flags. `None` once the round limit has been passed.
    ///
    /// # Panics
    /// If the previous round is still open or the session is not active.
    pub fn begin_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<RoundPlan> {
        assert!(self.current.is_none(), "round {} still open", self.round_number);
        assert_eq!(self.status, SessionStatus::Active, "session is not active");

        self.round_number += 1;
        let round = self.round_number;
        if round > MAX_ROUNDS {
            return None;
        }

        let guaranteed = !self.had_bonus && round >= BONUS_GUARANTEE_ROUND;
        let rolled = self.rounds_since_last_bonus >= BONUS_MIN_GAP
            && !self.participants.is_empty()
            && rng.random_bool(BONUS_CHANCE);
        self.is_bonus_round = guaranteed || rolled;
        if self.is_bonus_round {
            self.had_bonus = true;
            self.rounds_since_last_bonus = 0;
        } else {
            self.rounds_since_last_bonus += 1;
        }

        Some(RoundPlan {
            round,
            is_bonus: self.is_bonus_round,
            checkpoint_due: round > 1 && (round - 1) % CHECKPOINT_INTERVAL == 0,
            force_unused_type: round % FORCE_VARIETY_INTERVAL == 0
                && self.puzzle_type_history.len() < ARCHETYPE_ROTATION,
        })
    }

    pub fn open_round(&mut self, puzzle: PuzzleSpec, opened_at: Instant) {
        if !puzzle.is_multi_word {
            self.puzzle_type_history.insert(puzzle.archetype);
            if self.puzzle_type_history.len() >= ARCHETYPE_ROTATION {
                self.puzzle_type_history.clear();
            }
        }
        self.current = Some(OpenRound::new(
            self.round_number,
            puzzle,
            self.is_bonus_round,
            opened_at,
        ));
    }

    /// Resolve one candidate answer against the open round.
    pub fn resolve(&mut self, lexicon: &Lexicon, player: &str, raw: &str, now: Instant) -> Resolution {
        if self.status != SessionStatus::Active {
            return Resolution::Rejected(Rejection::RoundNotOpen);
        }
        let Some(round) = self.current.as_ref() else {
            return Resolution::Rejected(Rejection::RoundNotOpen);
        };

        let word = raw.trim().to_ascii_lowercase();
        if word.is_empty() || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return Resolution::Rejected(Rejection::NotAlphabetic);
        }
        if let Err(rejection) = round.check(lexicon, &self.used_words, player, &word) {
            return Resolution::Rejected(rejection);
        }

        let sequence = self.next_sequence();
        let Some(round) = self.current.as_mut() else {
            return Resolution::Rejected(Rejection::RoundNotOpen);
        };
        let (resolution, first) = round.accept(player, &word);
        let elapsed = round.elapsed(now);

        self.used_words.insert(word);
        self.participants.insert(player.to_string());

        if let Resolution::Accepted { points, .. } = &resolution {
            let tally = self
                .accumulated
                .entry(player.to_string())
                .or_insert_with(|| Tally {
                    first_seen: sequence,
                    ..Tally::default()
                });
            tally.score.points += i64::from(*points);
            tally.score.rounds_won += 1;
        }

        if first {
            let stats = self.stats.entry(player.to_string()).or_default();
            stats.streak += 1;
            stats.best_streak = stats.best_streak.max(stats.streak);
            if stats.fastest.is_none_or(|fastest| elapsed < fastest) {
                stats.fastest = Some(elapsed);
            }
        }

        resolution
    }

    /// Close the open round, settle multi-word awards and streaks, and update
    /// the scoreless counter.
    pub fn close_round(&mut self) -> Option<RoundResult> {
        let result = self.current.take()?.close();
        self.rounds_played += 1;

        if let Some(award) = &result.bonus_winner {
            let sequence = self.next_sequence();
            let tally = self
                .accumulated
                .entry(award.player.clone())
                .or_insert_with(|| Tally {
                    first_seen: sequence,
                    ..Tally::default()
                });
            tally.score.points += i64::from(award.points);
            tally.score.rounds_won += 1;
        }

        for (player, stats) in self.stats.iter_mut() {
            if !result.ranked_winners.contains(player) {
                stats.streak = 0;
            }
        }

        if result.had_correct_answer() {
            self.rounds_without_correct = 0;
        } else {
            self.rounds_without_correct += 1;
        }

        Some(result)
    }

    /// Rank the window's scores, fold them into lifetime totals and reset them.
    pub fn checkpoint(&mut self) -> Vec<Standing> {
        let mut window: Vec<(String, Tally)> = self.accumulated.drain().collect();
        window.sort_by(|(_, a), (_, b)| {
            b.score
                .points
                .cmp(&a.score.points)
                .then(b.score.rounds_won.cmp(&a.score.rounds_won))
                .then(a.first_seen.cmp(&b.first_seen))
        });

        let mut standings = Vec::with_capacity(window.len());
        for (standing, (player, tally)) in window.into_iter().enumerate() {
            let reached_at = self.next_sequence();
            let total = self.lifetime.entry(player.clone()).or_default();
            total.points += tally.score.points;
            total.rounds_won += tally.score.rounds_won;
            if tally.score.points != 0 {
                total.reached_at = reached_at;
            }

            standings.push(Standing {
                player,
                standing,
                points: tally.score.points,
                rounds_won: tally.score.rounds_won,
            });
        }
        standings
    }

    /// Run the final checkpoint and build the report. Only the first call
    /// returns a report.
    pub fn finish(&mut self, reason: FinishReason) -> Option<FinalReport> {
        if self.status == SessionStatus::Finished {
            return None;
        }
        if self.current.is_some() {
            self.close_round();
        }
        let final_checkpoint = self.checkpoint();
        self.status = SessionStatus::Finished;

        let mut totals: Vec<(&String, &Lifetime)> = self.lifetime.iter().collect();
        totals.sort_by(|(_, a), (_, b)| b.points.cmp(&a.points).then(a.reached_at.cmp(&b.reached_at)));

        let mvp = totals
            .first()
            .filter(|(_, total)| total.points > 0)
            .map(|(player, _)| player.to_string());

        let lines = totals
            .into_iter()
            .map(|(player, total)| {
                let stats = self.stats.get(player).cloned().unwrap_or_default();
                FinalLine {
                    player: player.clone(),
                    points: total.points,
                    rounds_won: total.rounds_won,
                    best_streak: stats.best_streak,
                    fastest: stats.fastest,
                }
            })
            .collect();

        Some(FinalReport {
            reason,
            rounds_played: self.rounds_played,
            final_checkpoint,
            lines,
            mvp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::puzzle::Constraint;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn lexicon() -> Lexicon {
        Lexicon::new([
            "apple", "ample", "amble", "angle", "axle", "maple", "staple", "apply", "happy", "paper",
        ])
    }

    fn letters_puzzle() -> PuzzleSpec {
        PuzzleSpec::new(
            Archetype::LettersAnywhere,
            "Word containing A, P (anywhere)".into(),
            Constraint::AllLetters(vec!['a', 'p']),
            Some(5),
            5,
        )
    }

    fn active_session(players: &[&str]) -> RushSession {
        let mut session = RushSession::new("host");
        for player in players {
            session.join(player).unwrap();
        }
        session.confirm_start("host").unwrap();
        session
    }

    /// Advance a round and open it with the given puzzle
    fn open(session: &mut RushSession, rng: &mut StdRng, puzzle: PuzzleSpec) -> RoundPlan {
        let plan = session.begin_round(rng).expect("within the round limit");
        session.open_round(puzzle, Instant::now());
        plan
    }

    #[test]
    fn only_the_host_can_start() {
        let mut session = RushSession::new("host");
        session.join("guest").unwrap();

        assert_eq!(session.confirm_start("guest"), Err(RushError::NotHost));
        assert_eq!(session.confirm_start("host"), Ok(()));
        assert_eq!(session.confirm_start("host"), Err(RushError::AlreadyStarted));
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn ranks_follow_acceptance_order() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(1);
        open(&mut session, &mut rng, letters_puzzle());

        let now = Instant::now();
        let words = ["apple", "ample", "maple", "apply", "happy", "paper"];
        let points: Vec<u32> = words
            .iter()
            .enumerate()
            .map(|(i, word)| match session.resolve(&lexicon, &format!("p{i}"), word, now) {
                Resolution::Accepted { points, .. } => points,
                other => panic!("unexpected {other:?}"),
            })
            .collect();

        assert_eq!(points, vec![5, 4, 3, 2, 1, 1]);
    }

    #[test]
    fn words_cannot_repeat_across_rounds() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(2);
        let now = Instant::now();

        open(&mut session, &mut rng, letters_puzzle());
        assert!(matches!(
            session.resolve(&lexicon, "amy", "apple", now),
            Resolution::Accepted { rank: 1, .. }
        ));
        session.close_round();

        open(&mut session, &mut rng, letters_puzzle());
        assert_eq!(
            session.resolve(&lexicon, "bob", "APPLE", now),
            Resolution::Rejected(Rejection::AlreadyUsed)
        );
        assert!(session.used_words().contains("apple"));
    }

    #[test]
    fn one_scored_answer_per_player_per_round() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(3);
        let now = Instant::now();
        open(&mut session, &mut rng, letters_puzzle());

        session.resolve(&lexicon, "amy", "apple", now);
        assert_eq!(
            session.resolve(&lexicon, "amy", "maple", now),
            Resolution::Rejected(Rejection::AlreadyAnswered)
        );
    }

    #[test]
    fn rejections_are_checked_cheapest_first() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let now = Instant::now();

        assert_eq!(
            session.resolve(&lexicon, "amy", "apple", now),
            Resolution::Rejected(Rejection::RoundNotOpen)
        );

        open(&mut session, &mut StdRng::seed_from_u64(4), letters_puzzle());
        let cases = [
            ("ap ple", Rejection::NotAlphabetic),
            ("staple", Rejection::WrongLength),
            ("appxe", Rejection::NotAWord),
            ("angle", Rejection::FailsConstraint),
        ];
        for (answer, expected) in cases {
            assert_eq!(
                session.resolve(&lexicon, "amy", answer, now),
                Resolution::Rejected(expected),
                "{answer}"
            );
        }
    }

    #[test]
    fn answering_registers_the_player() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        open(&mut session, &mut StdRng::seed_from_u64(5), letters_puzzle());

        session.resolve(&lexicon, "walk-in", "apple", Instant::now());

        assert!(session.participants().contains("walk-in"));
    }

    #[test]
    fn checkpoint_moves_window_into_lifetime() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(6);
        let now = Instant::now();

        open(&mut session, &mut rng, letters_puzzle());
        session.resolve(&lexicon, "amy", "apple", now);
        session.resolve(&lexicon, "bob", "ample", now);
        session.close_round();
        let first = session.checkpoint();
        assert_eq!(first[0].player, "amy");
        assert_eq!(first[0].points, 5);

        open(&mut session, &mut rng, letters_puzzle());
        session.resolve(&lexicon, "bob", "maple", now);
        session.close_round();

        let before_lifetime = session.lifetime_scores();
        let before_window = session.accumulated_scores();
        session.checkpoint();

        assert!(session.accumulated_scores().is_empty());
        let after = session.lifetime_scores();
        assert_eq!(after["bob"], before_lifetime["bob"] + before_window["bob"].points);
        assert_eq!(after["bob"], 9);
        assert_eq!(after["amy"], 5);
    }

    #[test]
    fn checkpoint_is_due_every_twelfth_round_past_the_first() {
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut due = Vec::new();

        for _ in 0..40 {
            let plan = session.begin_round(&mut rng).unwrap();
            if plan.checkpoint_due {
                due.push(plan.round);
            }
            session.open_round(letters_puzzle(), Instant::now());
            session.close_round();
        }

        assert_eq!(due, vec![13, 25, 37]);
    }

    #[test]
    fn bonus_round_is_guaranteed_by_round_nineteen() {
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(8);
        let mut first_bonus = None;

        for _ in 0..19 {
            let plan = session.begin_round(&mut rng).unwrap();
            if plan.is_bonus && first_bonus.is_none() {
                first_bonus = Some(plan.round);
            }
            session.open_round(letters_puzzle(), Instant::now());
            session.close_round();
        }

        let round = first_bonus.expect("a bonus round by 19");
        assert!(round <= BONUS_GUARANTEE_ROUND);
        assert!(round == BONUS_GUARANTEE_ROUND || round > BONUS_MIN_GAP);
    }

    #[test]
    fn bonus_rounds_triple_rank_points() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(9);

        loop {
            let plan = session.begin_round(&mut rng).unwrap();
            session.open_round(letters_puzzle(), Instant::now());
            if plan.is_bonus {
                break;
            }
            session.close_round();
        }

        let now = Instant::now();
        let words = ["apple", "ample", "maple", "apply", "happy", "paper"];
        let points: Vec<u32> = words
            .iter()
            .enumerate()
            .filter_map(|(i, word)| match session.resolve(&lexicon, &format!("p{i}"), word, now) {
                Resolution::Accepted { points, .. } => Some(points),
                _ => None,
            })
            .collect();

        assert_eq!(points, vec![15, 12, 9, 6, 3, 3]);
    }

    #[test]
    fn variety_is_forced_every_twentieth_round() {
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(10);

        let mut forced = Vec::new();
        for _ in 0..40 {
            let plan = session.begin_round(&mut rng).unwrap();
            if plan.force_unused_type {
                forced.push(plan.round);
            }
            session.open_round(letters_puzzle(), Instant::now());
            session.close_round();
        }

        assert_eq!(forced, vec![20, 40]);
        assert_eq!(session.used_types().len(), 1);
    }

    #[test]
    fn rotation_clears_once_every_standard_archetype_was_used() {
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(11);

        for (archetype, _) in Archetype::STANDARD.iter().take(ARCHETYPE_ROTATION - 1) {
            session.begin_round(&mut rng).unwrap();
            let mut puzzle = letters_puzzle();
            puzzle.archetype = *archetype;
            session.open_round(puzzle, Instant::now());
            session.close_round();
        }
        assert_eq!(session.used_types().len(), ARCHETYPE_ROTATION - 1);

        session.begin_round(&mut rng).unwrap();
        let mut last = letters_puzzle();
        last.archetype = Archetype::Antonym;
        session.open_round(last, Instant::now());

        assert!(session.used_types().is_empty());
    }

    #[test]
    fn four_scoreless_rounds_eliminate() {
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(12);

        for round in 1..=MAX_SCORELESS_ROUNDS {
            assert!(!session.is_eliminated(), "round {round}");
            open(&mut session, &mut rng, letters_puzzle());
            session.close_round();
        }

        assert!(session.is_eliminated());
    }

    #[test]
    fn round_limit_stops_advancing() {
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(13);

        for _ in 0..MAX_ROUNDS {
            open(&mut session, &mut rng, letters_puzzle());
            session.close_round();
        }

        assert!(session.begin_round(&mut rng).is_none());
        assert_eq!(session.round_number(), MAX_ROUNDS + 1);
        assert_eq!(session.rounds_played(), MAX_ROUNDS);
    }

    #[test]
    fn finish_runs_once_and_names_the_mvp() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(14);
        let now = Instant::now();

        open(&mut session, &mut rng, letters_puzzle());
        session.resolve(&lexicon, "amy", "apple", now);
        session.resolve(&lexicon, "bob", "ample", now);

        let report = session.finish(FinishReason::Stopped).expect("first finish");
        assert_eq!(report.mvp.as_deref(), Some("amy"));
        assert_eq!(report.final_checkpoint.len(), 2);
        assert_eq!(report.completions().count(), 2);
        assert_eq!(report.lines[0].best_streak, 1);

        assert!(session.finish(FinishReason::Victory).is_none());
        assert_eq!(session.status(), SessionStatus::Finished);
        assert_eq!(
            session.resolve(&lexicon, "amy", "maple", now),
            Resolution::Rejected(Rejection::RoundNotOpen)
        );
    }

    #[test]
    fn streaks_reset_for_players_who_miss_a_round() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(15);
        let now = Instant::now();

        open(&mut session, &mut rng, letters_puzzle());
        session.resolve(&lexicon, "amy", "apple", now);
        session.close_round();
        open(&mut session, &mut rng, letters_puzzle());
        session.resolve(&lexicon, "amy", "ample", now);
        session.close_round();
        open(&mut session, &mut rng, letters_puzzle());
        session.close_round();

        let stats = session.stats("amy").unwrap();
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.best_streak, 2);
    }

    #[test]
    fn fastest_time_keeps_the_quickest_answer() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(17);

        for (word, secs) in [("apple", 7), ("ample", 3), ("maple", 9)] {
            session.begin_round(&mut rng).expect("within the round limit");
            let opened_at = Instant::now();
            session.open_round(letters_puzzle(), opened_at);
            let answered_at = opened_at + Duration::from_secs(secs);
            assert!(matches!(
                session.resolve(&lexicon, "amy", word, answered_at),
                Resolution::Accepted { .. }
            ));
            session.close_round();
        }

        assert_eq!(session.stats("amy").unwrap().fastest, Some(Duration::from_secs(3)));
        let report = session.finish(FinishReason::Stopped).unwrap();
        assert_eq!(report.lines[0].fastest, Some(Duration::from_secs(3)));
    }

    #[test]
    fn multi_word_rounds_collect_and_award_the_best() {
        let lexicon = lexicon();
        let mut session = active_session(&[]);
        let mut rng = StdRng::seed_from_u64(16);
        let now = Instant::now();

        let solutions: BTreeSet<String> = ["apple", "maple", "staple", "apply"]
            .into_iter()
            .map(String::from)
            .collect();
        let puzzle = PuzzleSpec::new(
            Archetype::LongestWord,
            "BONUS: longest word containing PL".into(),
            Constraint::Contains("pl".into()),
            None,
            4,
        )
        .with_solution_set(solutions);
        open(&mut session, &mut rng, puzzle);

        assert_eq!(
            session.resolve(&lexicon, "amy", "apple", now),
            Resolution::Collected { word: "apple".into(), total: 1 }
        );
        assert_eq!(
            session.resolve(&lexicon, "amy", "maple", now),
            Resolution::Collected { word: "maple".into(), total: 2 }
        );
        assert_eq!(
            session.resolve(&lexicon, "bob", "amble", now),
            Resolution::Rejected(Rejection::NotInSolutionSet)
        );
        session.resolve(&lexicon, "bob", "staple", now);

        let result = session.close_round().unwrap();
        let award = result.bonus_winner.unwrap();
        assert_eq!(award.player, "bob");
        assert_eq!(session.accumulated_scores()["bob"].points, 15);
        assert!(!session.accumulated_scores().contains_key("amy"));
        assert!(session.used_types().is_empty());
    }

    #[test]
    fn expired_lobby_accepts_nothing() {
        let mut session = RushSession::new("host");
        assert!(session.expire_lobby());
        assert!(!session.expire_lobby());
        assert_eq!(session.join("late"), Err(RushError::NotAccepting));
        assert_eq!(session.confirm_start("host"), Err(RushError::NotAccepting));
    }
}
