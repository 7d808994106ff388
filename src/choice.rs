use serde::Deserialize;
use serde::Serialize;

/// A player's move in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    /// True when this move defeats the other.
    pub fn beats(&self, other: &Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors)
                | (Choice::Scissors, Choice::Paper)
                | (Choice::Paper, Choice::Rock)
        )
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Choice::Rock => write!(f, "rock"),
            Choice::Paper => write!(f, "paper"),
            Choice::Scissors => write!(f, "scissors"),
        }
    }
}

impl TryFrom<&str> for Choice {
    type Error = ();
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "rock" => Ok(Choice::Rock),
            "paper" => Ok(Choice::Paper),
            "scissors" => Ok(Choice::Scissors),
            _ => Err(()),
        }
    }
}

/// Resolution of one round: a seat took it, or nobody did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Initiator,
    Participant,
    Draw,
}

/// Resolves two simultaneous moves, first argument belonging to the
/// initiator seat. The one place where game rules live: swap this function
/// and the rest of the engine hosts a different duel.
pub fn resolve(initiator: Choice, participant: Choice) -> Outcome {
    if initiator == participant {
        Outcome::Draw
    } else if initiator.beats(&participant) {
        Outcome::Initiator
    } else {
        Outcome::Participant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];
    #[test]
    fn equal_moves_draw() {
        for c in ALL {
            assert_eq!(resolve(c, c), Outcome::Draw);
        }
    }
    #[test]
    fn distinct_moves_never_draw() {
        for a in ALL {
            for b in ALL {
                if a != b {
                    assert_ne!(resolve(a, b), Outcome::Draw);
                }
            }
        }
    }
    #[test]
    fn antisymmetric() {
        for a in ALL {
            for b in ALL {
                match resolve(a, b) {
                    Outcome::Initiator => assert_eq!(resolve(b, a), Outcome::Participant),
                    Outcome::Participant => assert_eq!(resolve(b, a), Outcome::Initiator),
                    Outcome::Draw => assert_eq!(resolve(b, a), Outcome::Draw),
                }
            }
        }
    }
    #[test]
    fn classic_cycle() {
        assert_eq!(resolve(Choice::Rock, Choice::Scissors), Outcome::Initiator);
        assert_eq!(resolve(Choice::Scissors, Choice::Paper), Outcome::Initiator);
        assert_eq!(resolve(Choice::Paper, Choice::Rock), Outcome::Initiator);
        assert_eq!(resolve(Choice::Scissors, Choice::Rock), Outcome::Participant);
        assert_eq!(resolve(Choice::Paper, Choice::Scissors), Outcome::Participant);
        assert_eq!(resolve(Choice::Rock, Choice::Paper), Outcome::Participant);
    }
    #[test]
    fn parse_moves() {
        assert_eq!(Choice::try_from("rock"), Ok(Choice::Rock));
        assert_eq!(Choice::try_from("paper"), Ok(Choice::Paper));
        assert_eq!(Choice::try_from("scissors"), Ok(Choice::Scissors));
        assert!(Choice::try_from("lizard").is_err());
        assert!(Choice::try_from("Rock").is_err());
    }
}
