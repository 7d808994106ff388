use super::*;

/// Running win tally for a session.
///
/// A cache over the round log, never independent state: [`Score::tally`]
/// recomputes it from scratch and the controller cross-checks the two after
/// every transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    wins: [u32; 2],
}

impl Score {
    /// Wins required to take the match outright.
    pub fn threshold(best_of: u32) -> u32 {
        best_of / 2 + 1
    }
    /// Recomputes the tally from resolved rounds.
    pub fn tally(rounds: &[Round]) -> Self {
        rounds
            .iter()
            .filter_map(Round::winner)
            .fold(Self::default(), |mut score, outcome| {
                score.record(outcome);
                score
            })
    }
    pub fn record(&mut self, outcome: Outcome) {
        if let Some(seat) = outcome.seat() {
            self.wins[seat.index()] += 1;
        }
    }
    pub fn wins(&self, seat: Seat) -> u32 {
        self.wins[seat.index()]
    }
    /// Rounds with a decisive winner; draws do not count.
    pub fn decisive(&self) -> u32 {
        self.wins[0] + self.wins[1]
    }
    pub fn tied(&self) -> bool {
        self.wins[0] == self.wins[1]
    }
    /// Seat that reached the majority threshold, if any.
    pub fn clinched(&self, best_of: u32) -> Option<Seat> {
        Seat::all()
            .into_iter()
            .find(|seat| self.wins(*seat) >= Self::threshold(best_of))
    }
    /// True when the allotted decisive rounds are spent with the tallies level.
    /// Reachable only under an even best-of.
    pub fn exhausted(&self, best_of: u32) -> bool {
        self.decisive() >= best_of && self.tied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    #[test]
    fn majority_thresholds() {
        assert_eq!(Score::threshold(1), 1);
        assert_eq!(Score::threshold(3), 2);
        assert_eq!(Score::threshold(5), 3);
        assert_eq!(Score::threshold(2), 2);
        assert_eq!(Score::threshold(4), 3);
    }
    #[test]
    fn draws_are_not_decisive() {
        let mut score = Score::default();
        score.record(Outcome::Draw);
        score.record(Outcome::Initiator);
        score.record(Outcome::Draw);
        assert_eq!(score.decisive(), 1);
        assert_eq!(score.wins(Seat::Initiator), 1);
        assert_eq!(score.wins(Seat::Participant), 0);
    }
    #[test]
    fn clinch_requires_threshold() {
        let mut score = Score::default();
        score.record(Outcome::Participant);
        assert_eq!(score.clinched(3), None);
        score.record(Outcome::Participant);
        assert_eq!(score.clinched(3), Some(Seat::Participant));
    }
    #[test]
    fn exhaustion_only_when_level() {
        let mut score = Score::default();
        score.record(Outcome::Initiator);
        score.record(Outcome::Participant);
        assert!(score.exhausted(2));
        assert!(!score.exhausted(3));
        score.record(Outcome::Initiator);
        assert!(!score.exhausted(2));
    }
    #[test]
    fn tally_matches_incremental_record() {
        let now = SystemTime::now();
        let mut rounds = Vec::new();
        let mut score = Score::default();
        for (number, outcome) in [
            (1, Outcome::Initiator),
            (2, Outcome::Draw),
            (3, Outcome::Participant),
            (4, Outcome::Initiator),
        ] {
            let mut round = Round::open(number, now);
            round.close(outcome, now);
            rounds.push(round);
            score.record(outcome);
        }
        assert_eq!(Score::tally(&rounds), score);
    }
}
