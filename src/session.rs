use super::*;
use serde::Serialize;
use std::time::SystemTime;

/// Session lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InProgress,
    Completed,
    Forfeited,
    Abandoned,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::InProgress)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::InProgress => write!(f, "in progress"),
            Phase::Completed => write!(f, "completed"),
            Phase::Forfeited => write!(f, "forfeited"),
            Phase::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Field names that moved, for change notifications.
pub type Changed = Vec<&'static str>;

/// Consecutive silent round timeouts tolerated before the match is
/// abandoned outright.
const SILENT_ROUND_LIMIT: u8 = 2;

/// One match between two chat members.
///
/// Functional core of the engine. Every mutation is a synchronous command
/// taking `now` from the caller and returning the changed field names, so
/// the surrounding controller stays a thin shell and every transition,
/// including timer races, is reproducible in tests without a runtime.
///
/// The round log is append-only and authoritative; the score is a cache
/// over it, checked by [`Session::consistent`].
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    id: ID<Self>,
    chat: ID<Chat>,
    members: [ID<Member>; 2],
    config: GameConfig,
    phase: Phase,
    rounds: Vec<Round>,
    score: Score,
    winner: Option<ID<Member>>,
    silent: u8,
    created_at: SystemTime,
    last_activity_at: SystemTime,
    completed_at: Option<SystemTime>,
}

impl Unique for Session {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Session {
    /// Opens a session with round 1 live.
    pub fn new(
        chat: ID<Chat>,
        initiator: ID<Member>,
        participant: ID<Member>,
        config: GameConfig,
        now: SystemTime,
    ) -> Self {
        Self {
            id: ID::default(),
            chat,
            members: [initiator, participant],
            config: config.normalized(),
            phase: Phase::InProgress,
            rounds: vec![Round::open(1, now)],
            score: Score::default(),
            winner: None,
            silent: 0,
            created_at: now,
            last_activity_at: now,
            completed_at: None,
        }
    }

    pub fn chat(&self) -> ID<Chat> {
        self.chat
    }
    pub fn member(&self, seat: Seat) -> ID<Member> {
        self.members[seat.index()]
    }
    pub fn seat_of(&self, user: ID<Member>) -> Option<Seat> {
        Seat::all().into_iter().find(|s| self.member(*s) == user)
    }
    pub fn config(&self) -> GameConfig {
        self.config
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }
    pub fn current_round(&self) -> u32 {
        self.rounds.len() as u32
    }
    /// The live round, absent once the session is terminal.
    pub fn open_round(&self) -> Option<&Round> {
        self.rounds.last().filter(|r| !r.is_resolved())
    }
    pub fn score(&self) -> Score {
        self.score
    }
    pub fn winner(&self) -> Option<ID<Member>> {
        self.winner
    }
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
    pub fn last_activity_at(&self) -> SystemTime {
        self.last_activity_at
    }
    pub fn completed_at(&self) -> Option<SystemTime> {
        self.completed_at
    }

    /// Records `user`'s move for the current round. The second move in
    /// resolves the round and possibly the match.
    ///
    /// A repeat submission is rejected loudly rather than absorbed, so a
    /// double-sending client can notice its own bug.
    pub fn submit(
        &mut self,
        user: ID<Member>,
        choice: Choice,
        now: SystemTime,
    ) -> Result<Changed, GameError> {
        let seat = self.seat_of(user).ok_or(GameError::NotAParticipant)?;
        if self.phase.is_terminal() {
            return Err(GameError::SessionNotInProgress);
        }
        let round = self.rounds.last_mut().expect("open round");
        if round.chosen(seat) {
            return Err(GameError::ChoiceAlreadySubmitted);
        }
        round.submit(seat, choice);
        self.silent = 0;
        self.last_activity_at = now;
        let complete = Seat::all().iter().all(|s| round.chosen(*s));
        let mut changed = vec![fields::ROUNDS];
        if complete {
            changed.extend(self.settle(now));
        }
        Ok(changed)
    }

    /// Immediate concession. Accepted in any non-terminal state regardless
    /// of round progress; the opponent takes the match.
    pub fn forfeit(&mut self, user: ID<Member>, now: SystemTime) -> Result<Changed, GameError> {
        let seat = self.seat_of(user).ok_or(GameError::NotAParticipant)?;
        if self.phase.is_terminal() {
            return Err(GameError::SessionNotInProgress);
        }
        self.last_activity_at = now;
        Ok(self.conclude(Phase::Forfeited, Some(self.member(seat.other())), now))
    }

    /// Round clock expiry, tagged with the round it was armed for.
    ///
    /// A stale tag (the round already resolved by a submission that raced
    /// the clock, or the session moved on) is discarded without effect: the
    /// race has exactly one winner and it is decided here, not by OS timer
    /// cancellation.
    pub fn round_timeout(&mut self, round: u32, now: SystemTime) -> Changed {
        if self.phase.is_terminal() || round != self.current_round() {
            return Vec::new();
        }
        let Some(current) = self.rounds.last_mut() else {
            return Vec::new();
        };
        if current.is_resolved() {
            return Vec::new();
        }
        let outcome = match (current.lone(), self.config.timeout_policy) {
            (Some(seat), TimeoutPolicy::AwardLoneSubmitter) => Outcome::win(seat),
            _ => Outcome::Draw,
        };
        self.silent = match current.submissions() {
            0 => self.silent + 1,
            _ => 0,
        };
        current.close(outcome, now);
        let mut changed = vec![fields::ROUNDS];
        if self.silent >= SILENT_ROUND_LIMIT {
            changed.extend(self.conclude(Phase::Abandoned, None, now));
        } else {
            changed.extend(self.advance(outcome, now));
        }
        changed
    }

    /// Match clock expiry. A decided match has already left `InProgress`,
    /// so anything still running when the whole-match deadline lands is
    /// abandoned with no winner.
    pub fn match_timeout(&mut self, now: SystemTime) -> Changed {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.conclude(Phase::Abandoned, None, now)
    }

    /// Terminal escape hatch for a failed integrity check.
    pub(crate) fn abort(&mut self, now: SystemTime) -> Changed {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.conclude(Phase::Abandoned, None, now)
    }

    /// Cross-checks cached state against the round log. Drift means the
    /// session can no longer be trusted; the controller force-abandons it.
    pub fn consistent(&self) -> bool {
        Score::tally(&self.rounds) == self.score
            && self
                .rounds
                .iter()
                .enumerate()
                .all(|(i, r)| r.number() as usize == i + 1)
            && self.rounds.iter().rev().skip(1).all(Round::is_resolved)
            && (self.phase.is_terminal() || self.open_round().is_some())
            && (!self.phase.is_terminal() || self.completed_at.is_some())
    }

    /// Resolves the fully submitted current round and advances the match.
    fn settle(&mut self, now: SystemTime) -> Changed {
        let round = self.rounds.last_mut().expect("open round");
        let Some(outcome) = round.resolve(now) else {
            log::error!("[session {}] round settled without both choices", self.id);
            return self.abort(now);
        };
        self.advance(outcome, now)
    }

    /// Post-resolution bookkeeping shared by submissions and timeouts:
    /// records the outcome, completes the match on majority or exhaustion,
    /// or opens the next round.
    fn advance(&mut self, outcome: Outcome, now: SystemTime) -> Changed {
        self.score.record(outcome);
        let mut changed = match outcome.seat() {
            Some(_) => vec![fields::SCORE],
            None => Vec::new(),
        };
        if let Some(seat) = self.score.clinched(self.config.best_of) {
            changed.extend(self.conclude(Phase::Completed, Some(self.member(seat)), now));
        } else if self.score.exhausted(self.config.best_of) {
            changed.extend(self.conclude(Phase::Completed, None, now));
        } else {
            let next = self.current_round() + 1;
            self.rounds.push(Round::open(next, now));
            changed.push(fields::CURRENT_ROUND);
        }
        changed
    }

    /// Ends the match. Runs exactly once per session.
    fn conclude(
        &mut self,
        phase: Phase,
        winner: Option<ID<Member>>,
        now: SystemTime,
    ) -> Changed {
        self.phase = phase;
        self.winner = winner;
        self.completed_at = Some(now);
        let mut changed = vec![fields::STATE];
        if winner.is_some() {
            changed.push(fields::WINNER);
        }
        changed
    }
}
