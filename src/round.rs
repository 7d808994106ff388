use super::*;
use std::time::SystemTime;

/// Table seat within a session. The initiator opened the game from the
/// chat; the participant accepted it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seat {
    Initiator,
    Participant,
}

impl Seat {
    pub fn all() -> [Seat; 2] {
        [Seat::Initiator, Seat::Participant]
    }
    pub fn other(&self) -> Seat {
        match self {
            Seat::Initiator => Seat::Participant,
            Seat::Participant => Seat::Initiator,
        }
    }
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl Outcome {
    /// Round win for the given seat.
    pub fn win(seat: Seat) -> Outcome {
        match seat {
            Seat::Initiator => Outcome::Initiator,
            Seat::Participant => Outcome::Participant,
        }
    }
    /// Winning seat, if the round was decisive.
    pub fn seat(&self) -> Option<Seat> {
        match self {
            Outcome::Initiator => Some(Seat::Initiator),
            Outcome::Participant => Some(Seat::Participant),
            Outcome::Draw => None,
        }
    }
}

/// One exchange of simultaneous moves.
///
/// Choices are write-once. The winner is present exactly when both choices
/// landed or the round was force-resolved by a timeout.
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    number: u32,
    choices: [Option<Choice>; 2],
    winner: Option<Outcome>,
    opened_at: SystemTime,
    resolved_at: Option<SystemTime>,
}

impl Round {
    pub fn open(number: u32, now: SystemTime) -> Self {
        Self {
            number,
            choices: [None; 2],
            winner: None,
            opened_at: now,
            resolved_at: None,
        }
    }
    pub fn number(&self) -> u32 {
        self.number
    }
    pub fn choice(&self, seat: Seat) -> Option<Choice> {
        self.choices[seat.index()]
    }
    pub fn chosen(&self, seat: Seat) -> bool {
        self.choice(seat).is_some()
    }
    pub fn submissions(&self) -> usize {
        self.choices.iter().filter(|c| c.is_some()).count()
    }
    /// The only seat with a choice in, if exactly one has committed.
    pub fn lone(&self) -> Option<Seat> {
        match (self.choices[0], self.choices[1]) {
            (Some(_), None) => Some(Seat::Initiator),
            (None, Some(_)) => Some(Seat::Participant),
            _ => None,
        }
    }
    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }
    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }
    pub fn opened_at(&self) -> SystemTime {
        self.opened_at
    }
    pub fn resolved_at(&self) -> Option<SystemTime> {
        self.resolved_at
    }
    /// Records a choice. First write wins; the session rejects duplicates
    /// before getting here.
    pub(crate) fn submit(&mut self, seat: Seat, choice: Choice) {
        self.choices[seat.index()].get_or_insert(choice);
    }
    /// Resolves from two committed choices. None if either is missing.
    pub(crate) fn resolve(&mut self, now: SystemTime) -> Option<Outcome> {
        match (self.choices[0], self.choices[1]) {
            (Some(a), Some(b)) => {
                let outcome = resolve(a, b);
                self.winner = Some(outcome);
                self.resolved_at = Some(now);
                Some(outcome)
            }
            _ => None,
        }
    }
    /// Force-resolves an incomplete round on timeout.
    pub(crate) fn close(&mut self, outcome: Outcome, now: SystemTime) {
        self.winner = Some(outcome);
        self.resolved_at = Some(now);
    }
}
