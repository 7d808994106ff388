use super::*;
use serde::Serialize;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Snapshot of a session as a given requester may see it.
///
/// Redaction rule: in the current open round an opponent's submitted choice
/// is reduced to a committed flag; resolved rounds are public. The engine,
/// not the client, enforces this, since any client-side arbiter could be
/// modified to peek before committing. Ids cross the wire as strings and
/// timestamps as unix milliseconds.
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub session: String,
    pub chat: String,
    pub initiator: String,
    pub participant: String,
    pub best_of: u32,
    pub state: Phase,
    pub current_round: u32,
    pub rounds: Vec<RoundView>,
    pub score: Vec<ScoreEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub created_at: u64,
    pub last_activity_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
}

/// One round as the requester may see it.
#[derive(Clone, Debug, Serialize)]
pub struct RoundView {
    pub number: u32,
    pub initiator: ChoiceSlot,
    pub participant: ChoiceSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Outcome>,
    pub opened_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<u64>,
}

/// One seat's slice of a round: whether a choice is in, and the choice
/// itself once the requester is allowed to see it.
#[derive(Clone, Debug, Serialize)]
pub struct ChoiceSlot {
    pub committed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<Choice>,
}

/// Win count for one member.
#[derive(Clone, Debug, Serialize)]
pub struct ScoreEntry {
    pub user: String,
    pub wins: u32,
}

impl SessionView {
    /// Projects a session for `requester`. Works for participants and for
    /// observers; an observer gets both open-round choices masked.
    pub fn of(session: &Session, requester: ID<Member>) -> Self {
        let me = session.seat_of(requester);
        Self {
            session: session.id().to_string(),
            chat: session.chat().to_string(),
            initiator: session.member(Seat::Initiator).to_string(),
            participant: session.member(Seat::Participant).to_string(),
            best_of: session.config().best_of,
            state: session.phase(),
            current_round: session.current_round(),
            rounds: session
                .rounds()
                .iter()
                .map(|round| RoundView::of(round, me))
                .collect(),
            score: Seat::all()
                .into_iter()
                .map(|seat| ScoreEntry {
                    user: session.member(seat).to_string(),
                    wins: session.score().wins(seat),
                })
                .collect(),
            winner: session.winner().map(|w| w.to_string()),
            created_at: millis(session.created_at()),
            last_activity_at: millis(session.last_activity_at()),
            completed_at: session.completed_at().map(millis),
        }
    }
}

impl RoundView {
    fn of(round: &Round, me: Option<Seat>) -> Self {
        Self {
            number: round.number(),
            initiator: ChoiceSlot::of(round, Seat::Initiator, me),
            participant: ChoiceSlot::of(round, Seat::Participant, me),
            winner: round.winner(),
            opened_at: millis(round.opened_at()),
            resolved_at: round.resolved_at().map(millis),
        }
    }
}

impl ChoiceSlot {
    fn of(round: &Round, seat: Seat, me: Option<Seat>) -> Self {
        let visible = round.is_resolved() || me == Some(seat);
        Self {
            committed: round.chosen(seat),
            choice: round.choice(seat).filter(|_| visible),
        }
    }
}

fn millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
