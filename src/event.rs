use super::*;

/// Field names reported in [`StateChange::changed`].
pub mod fields {
    pub const STATE: &str = "state";
    pub const ROUNDS: &str = "rounds";
    pub const SCORE: &str = "score";
    pub const WINNER: &str = "winner";
    pub const CURRENT_ROUND: &str = "current_round";
}

/// Notification emitted on every committed state transition.
///
/// The messaging layer owns delivery to both participants (push, socket, or
/// poll); the engine only reports which session moved and which fields moved
/// with it. Recipients fetch their own redacted view, so the notification
/// itself carries nothing secret.
#[derive(Clone, Debug)]
pub struct StateChange {
    pub session: ID<Session>,
    pub chat: ID<Chat>,
    pub changed: Vec<&'static str>,
}

impl std::fmt::Display for StateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session {} changed [{}]", self.session, self.changed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn display_lists_fields() {
        let change = StateChange {
            session: ID::default(),
            chat: ID::default(),
            changed: vec![fields::STATE, fields::WINNER],
        };
        assert!(change.to_string().ends_with("[state, winner]"));
    }
}
