use std::time::Duration;

/// What to do when the round clock runs out with exactly one choice in.
/// The authoritative behavior is a product decision, so it is a knob rather
/// than a constant; the default awards the round to the player who showed up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// The lone submitter takes the round.
    #[default]
    AwardLoneSubmitter,
    /// The round counts as a draw regardless of submissions.
    DrawRound,
}

/// Per-session settings supplied at game start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Match format: first seat to `best_of / 2 + 1` round wins takes the
    /// match. Odd values are the intended format; even values are accepted
    /// and can end in a drawn match.
    pub best_of: u32,
    /// Clock for each round, armed when the round opens.
    pub round_timeout: Duration,
    /// Clock for the whole match, armed once at session start.
    pub match_timeout: Duration,
    pub timeout_policy: TimeoutPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            best_of: 3,
            round_timeout: Duration::from_secs(10),
            match_timeout: Duration::from_secs(60),
            timeout_policy: TimeoutPolicy::default(),
        }
    }
}

impl GameConfig {
    /// Sanitized copy; a zero best-of is bumped to a single round.
    pub(crate) fn normalized(self) -> Self {
        Self {
            best_of: self.best_of.max(1),
            ..self
        }
    }
}
