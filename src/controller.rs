use super::*;
use std::time::SystemTime;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio::sync::watch;

/// Owns one [`Session`] and serializes every mutation against it.
///
/// Imperative shell around the session state machine: consumes the command
/// stream, arms the two clocks, publishes snapshots, and reports committed
/// transitions. Timer expiries are converted into tagged commands on the
/// same stream as player actions, so a submission racing a clock is decided
/// by queue order and nothing else.
pub struct Controller {
    session: Session,
    timer: Timer,
    armed_round: u32,
    commands: UnboundedReceiver<Command>,
    snapshots: watch::Sender<Session>,
    notify: UnboundedSender<StateChange>,
}

impl Controller {
    /// Spawns the controller task for a fresh session. Returns the handle
    /// plus a completion signal that fires once the session goes terminal.
    pub fn spawn(
        session: Session,
        notify: UnboundedSender<StateChange>,
    ) -> (SessionHandle, oneshot::Receiver<()>) {
        let (commands, inbox) = unbounded_channel();
        let (snapshots, reads) = watch::channel(session.clone());
        let (done, finished) = oneshot::channel();
        let handle = SessionHandle {
            id: session.id(),
            chat: session.chat(),
            commands,
            snapshots: reads,
        };
        let mut timer = Timer::new(&session.config());
        timer.start_match();
        timer.start_round();
        let controller = Self {
            armed_round: session.current_round(),
            session,
            timer,
            commands: inbox,
            snapshots,
            notify,
        };
        tokio::spawn(controller.run(done));
        (handle, finished)
    }

    async fn run(mut self, done: oneshot::Sender<()>) {
        log::info!(
            "[session {}] started (best of {})",
            self.session.id(),
            self.session.config().best_of
        );
        while !self.session.is_over() {
            let command = tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
                _ = tokio::time::sleep_until(Timer::horizon(self.timer.round_deadline())),
                    if self.timer.round_deadline().is_some() =>
                    Command::RoundTimeout { round: self.armed_round },
                _ = tokio::time::sleep_until(Timer::horizon(self.timer.match_deadline())),
                    if self.timer.match_deadline().is_some() =>
                    Command::MatchTimeout,
            };
            self.apply(command);
        }
        self.timer.clear();
        log::info!(
            "[session {}] finished: {}",
            self.session.id(),
            self.session.phase()
        );
        let _ = done.send(());
    }

    /// Runs one command against the session and commits the result.
    fn apply(&mut self, command: Command) {
        log::debug!("[session {}] {}", self.session.id(), command);
        let now = SystemTime::now();
        let changed = match command {
            Command::Submit {
                user,
                choice,
                reply,
            } => {
                let result = self.session.submit(user, choice, now);
                self.answer(reply, result)
            }
            Command::Forfeit { user, reply } => {
                let result = self.session.forfeit(user, now);
                self.answer(reply, result)
            }
            Command::RoundTimeout { round } => self.session.round_timeout(round, now),
            Command::MatchTimeout => self.session.match_timeout(now),
        };
        if !changed.is_empty() {
            self.commit(changed);
        }
        self.sync(now);
    }

    /// Relays a command verdict to its caller; client errors are the
    /// caller's problem and only show up at debug level.
    fn answer(&self, reply: Reply, result: Result<Changed, GameError>) -> Changed {
        if let Err(e) = &result {
            log::debug!("[session {}] rejected: {}", self.session.id(), e);
        }
        let _ = reply.send(result.as_ref().map(|_| ()).map_err(Clone::clone));
        result.unwrap_or_default()
    }

    /// Publishes the snapshot and notifies the messaging layer.
    fn commit(&mut self, changed: Changed) {
        let change = StateChange {
            session: self.session.id(),
            chat: self.session.chat(),
            changed,
        };
        log::debug!("[controller] {}", change);
        let _ = self.snapshots.send(self.session.clone());
        if let Err(e) = self.notify.send(change) {
            log::warn!("[session {}] notify failed: {:?}", self.session.id(), e);
        }
    }

    /// Re-arms the clocks to match the session, force-abandoning first if
    /// the integrity check fails.
    fn sync(&mut self, now: SystemTime) {
        if !self.session.consistent() {
            log::error!(
                "[session {}] state diverged from round log, abandoning",
                self.session.id()
            );
            let changed = self.session.abort(now);
            if !changed.is_empty() {
                self.commit(changed);
            }
        }
        if self.session.is_over() {
            self.timer.clear();
        } else if self.armed_round != self.session.current_round() {
            self.armed_round = self.session.current_round();
            self.timer.start_round();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn fixture(config: GameConfig) -> (SessionHandle, oneshot::Receiver<()>, Members, Events) {
        let initiator = ID::default();
        let participant = ID::default();
        let session = Session::new(
            ID::default(),
            initiator,
            participant,
            config,
            SystemTime::now(),
        );
        let (notify, events) = unbounded_channel();
        let (handle, finished) = Controller::spawn(session, notify);
        (handle, finished, (initiator, participant), events)
    }
    type Members = (ID<Member>, ID<Member>);
    type Events = UnboundedReceiver<StateChange>;

    #[tokio::test(start_paused = true)]
    async fn resolves_round_from_two_submissions() {
        let (handle, _finished, (a, b), _events) = fixture(GameConfig::default());
        handle.submit(a, Choice::Rock).await.unwrap();
        handle.submit(b, Choice::Scissors).await.unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.rounds()[0].winner(), Some(Outcome::Initiator));
        assert_eq!(snapshot.current_round(), 2);
        assert!(snapshot.open_round().is_some_and(|r| r.submissions() == 0));
    }
    #[tokio::test(start_paused = true)]
    async fn double_submission_answered_with_error() {
        let (handle, _finished, (a, _), _events) = fixture(GameConfig::default());
        handle.submit(a, Choice::Rock).await.unwrap();
        let err = handle.submit(a, Choice::Paper).await.unwrap_err();
        assert_eq!(err, GameError::ChoiceAlreadySubmitted);
    }
    #[tokio::test(start_paused = true)]
    async fn round_clock_awards_lone_submitter() {
        let (handle, _finished, (a, _), _events) = fixture(GameConfig::default());
        handle.submit(a, Choice::Rock).await.unwrap();
        tokio::time::sleep(Duration::from_secs(11)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.score().wins(Seat::Initiator), 1);
        assert_eq!(snapshot.current_round(), 2);
        assert_eq!(snapshot.phase(), Phase::InProgress);
    }
    #[tokio::test(start_paused = true)]
    async fn resolved_round_outlives_its_clock() {
        // rounds 1 and 2 both resolve by submission before their deadlines;
        // when those deadlines pass, the expiries must not leak into round 3
        let (handle, _finished, (a, b), _events) = fixture(GameConfig::default());
        handle.submit(a, Choice::Rock).await.unwrap();
        handle.submit(b, Choice::Paper).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.submit(a, Choice::Rock).await.unwrap();
        handle.submit(b, Choice::Scissors).await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.current_round(), 3);
        assert!(snapshot.open_round().is_some_and(|r| r.submissions() == 0));
        assert_eq!(snapshot.score().wins(Seat::Initiator), 1);
        assert_eq!(snapshot.score().wins(Seat::Participant), 1);
    }
    #[tokio::test(start_paused = true)]
    async fn silent_session_abandons_after_two_round_clocks() {
        let (handle, finished, _, _events) = fixture(GameConfig::default());
        tokio::time::sleep(Duration::from_secs(21)).await;
        finished.await.unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase(), Phase::Abandoned);
        assert_eq!(snapshot.winner(), None);
    }
    #[tokio::test(start_paused = true)]
    async fn match_clock_abandons_long_game() {
        let config = GameConfig {
            round_timeout: Duration::from_secs(60),
            match_timeout: Duration::from_secs(5),
            ..GameConfig::default()
        };
        let (handle, finished, (a, _), _events) = fixture(config);
        handle.submit(a, Choice::Rock).await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        finished.await.unwrap();
        assert_eq!(handle.snapshot().phase(), Phase::Abandoned);
    }
    #[tokio::test(start_paused = true)]
    async fn forfeit_finishes_task_and_closes_stream() {
        let (handle, finished, (a, b), _events) = fixture(GameConfig::default());
        handle.forfeit(a).await.unwrap();
        finished.await.unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase(), Phase::Forfeited);
        assert_eq!(snapshot.winner(), Some(b));
        let err = handle.submit(a, Choice::Rock).await.unwrap_err();
        assert_eq!(err, GameError::SessionNotInProgress);
    }
    #[tokio::test(start_paused = true)]
    async fn transitions_are_notified_with_changed_fields() {
        let (handle, _finished, (a, b), mut events) = fixture(GameConfig::default());
        handle.submit(a, Choice::Rock).await.unwrap();
        let change = events.recv().await.unwrap();
        assert_eq!(change.session, handle.id);
        assert_eq!(change.chat, handle.chat);
        assert_eq!(change.changed, vec![fields::ROUNDS]);
        handle.submit(b, Choice::Scissors).await.unwrap();
        let change = events.recv().await.unwrap();
        assert!(change.changed.contains(&fields::SCORE));
        assert!(change.changed.contains(&fields::CURRENT_ROUND));
    }
    #[tokio::test(start_paused = true)]
    async fn rejected_commands_are_not_notified() {
        let (handle, _finished, (a, _), mut events) = fixture(GameConfig::default());
        handle.submit(a, Choice::Rock).await.unwrap();
        let _ = events.recv().await.unwrap();
        let _ = handle.submit(a, Choice::Rock).await.unwrap_err();
        handle.forfeit(a).await.unwrap();
        let change = events.recv().await.unwrap();
        assert!(change.changed.contains(&fields::STATE));
    }
}
