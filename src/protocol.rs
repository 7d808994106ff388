use super::*;
use serde::Serialize;

/// Errors from parsing client move messages.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    UnknownChoice(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownChoice(s) => write!(f, "unknown choice: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Push envelope for the messaging layer.
///
/// The engine emits [`StateChange`] internally; this is the JSON shape the
/// chat layer forwards to each recipient after fetching their view.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameMessage {
    /// Fresh redacted state for one recipient.
    State { view: SessionView },
    /// Terminal result, pushed alongside the final state.
    Over {
        session: String,
        state: Phase,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<String>,
    },
}

impl GameMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize game message")
    }
}

/// Conversion between wire strings and engine types.
pub struct Protocol;

impl Protocol {
    /// Parses a client move string.
    pub fn decode(s: &str) -> Result<Choice, ProtocolError> {
        Choice::try_from(s).map_err(|_| ProtocolError::UnknownChoice(s.to_string()))
    }
    /// Builds the per-recipient push for a committed transition.
    pub fn encode(session: &Session, recipient: ID<Member>) -> GameMessage {
        GameMessage::State {
            view: SessionView::of(session, recipient),
        }
    }
    /// Terminal push once the session leaves play.
    pub fn conclusion(session: &Session) -> Option<GameMessage> {
        session.phase().is_terminal().then(|| GameMessage::Over {
            session: session.id().to_string(),
            state: session.phase(),
            winner: session.winner().map(|w| w.to_string()),
        })
    }
}
