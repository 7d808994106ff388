use super::*;
use tokio::sync::oneshot;

/// Reply channel for player-issued commands.
pub type Reply = oneshot::Sender<Result<(), GameError>>;

/// One entry in a session's serialized command stream.
///
/// Player actions and timer expiries funnel through the same queue, so one
/// session never sees two mutations at once and every race between a
/// submission and a clock has a deterministic winner.
#[derive(Debug)]
pub enum Command {
    /// Player move for the current round.
    Submit {
        user: ID<Member>,
        choice: Choice,
        reply: Reply,
    },
    /// Voluntary concession.
    Forfeit { user: ID<Member>, reply: Reply },
    /// Round clock expired. Tagged with the round it was armed for, so a
    /// stale expiry cannot touch a later round.
    RoundTimeout { round: u32 },
    /// Match clock expired.
    MatchTimeout,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // an unresolved choice stays out of logs, same as out of views
        match self {
            Command::Submit { user, .. } => write!(f, "submit({})", user),
            Command::Forfeit { user, .. } => write!(f, "forfeit({})", user),
            Command::RoundTimeout { round } => write!(f, "round {} timeout", round),
            Command::MatchTimeout => write!(f, "match timeout"),
        }
    }
}
