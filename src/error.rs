/// Client-recoverable failures, returned synchronously to the caller.
///
/// These are the caller's fault and never logged as engine bugs. Timeouts
/// and forfeits are ordinary transitions and do not appear here; an internal
/// invariant violation is not an error value either, it force-abandons the
/// session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    /// The acting user is not one of the two players.
    NotAParticipant,
    /// The session already reached a terminal state.
    SessionNotInProgress,
    /// The user already has a choice recorded for the current round.
    ChoiceAlreadySubmitted,
    /// No live or recently finished session under that id.
    SessionNotFound,
    /// The chat already hosts an in-progress game.
    AlreadyInProgress,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAParticipant => write!(f, "not a participant in this game"),
            Self::SessionNotInProgress => write!(f, "game is not in progress"),
            Self::ChoiceAlreadySubmitted => write!(f, "choice already submitted this round"),
            Self::SessionNotFound => write!(f, "game session not found"),
            Self::AlreadyInProgress => write!(f, "a game is already in progress for this chat"),
        }
    }
}

impl std::error::Error for GameError {}
