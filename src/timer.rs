use super::*;
use std::time::Duration;
use tokio::time::Instant;

/// Deadline tracking for one session: a per-round clock and a whole-match
/// clock, armed and cleared independently. Expiry handling lives in the
/// controller; this type only does the arithmetic.
#[derive(Debug)]
pub struct Timer {
    round_timeout: Duration,
    match_timeout: Duration,
    round: Option<Instant>,
    overall: Option<Instant>,
}

impl Timer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            round_timeout: config.round_timeout,
            match_timeout: config.match_timeout,
            round: None,
            overall: None,
        }
    }
    /// Arms the match clock. Called once per session; it runs across rounds.
    pub fn start_match(&mut self) {
        self.overall = Some(Instant::now() + self.match_timeout);
    }
    /// Arms the round clock for a freshly opened round. Never restarted
    /// mid-round.
    pub fn start_round(&mut self) {
        self.round = Some(Instant::now() + self.round_timeout);
    }
    pub fn clear_round(&mut self) {
        self.round = None;
    }
    /// Disarms both clocks on terminal transition.
    pub fn clear(&mut self) {
        self.round = None;
        self.overall = None;
    }
    pub fn round_deadline(&self) -> Option<Instant> {
        self.round
    }
    pub fn match_deadline(&self) -> Option<Instant> {
        self.overall
    }
    pub fn round_remaining(&self) -> Option<Duration> {
        self.round
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
    /// Concrete instant for `sleep_until`; a disarmed clock sleeps far out.
    pub(crate) fn horizon(deadline: Option<Instant>) -> Instant {
        deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn starts_disarmed() {
        let timer = Timer::new(&GameConfig::default());
        assert!(timer.round_deadline().is_none());
        assert!(timer.match_deadline().is_none());
        assert!(timer.round_remaining().is_none());
    }
    #[test]
    fn arms_and_clears_round() {
        let mut timer = Timer::new(&GameConfig::default());
        timer.start_round();
        assert!(timer.round_deadline().is_some());
        assert!(timer.round_remaining().is_some());
        timer.clear_round();
        assert!(timer.round_deadline().is_none());
    }
    #[test]
    fn clear_disarms_both() {
        let mut timer = Timer::new(&GameConfig::default());
        timer.start_match();
        timer.start_round();
        timer.clear();
        assert!(timer.round_deadline().is_none());
        assert!(timer.match_deadline().is_none());
    }
    #[test]
    fn horizon_far_out_when_disarmed() {
        let soon = Instant::now() + Duration::from_secs(60);
        assert!(Timer::horizon(None) > soon);
        assert_eq!(Timer::horizon(Some(soon)), soon);
    }
}
