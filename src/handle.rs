use super::*;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio::sync::watch;

/// Handle to a running session controller.
///
/// Commands go down the serialized stream; reads come off the latest
/// committed snapshot and never queue behind pending commands. Once the
/// controller exits, sends fail and the last snapshot stays readable.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    pub id: ID<Session>,
    pub chat: ID<Chat>,
    pub commands: UnboundedSender<Command>,
    pub snapshots: watch::Receiver<Session>,
}

impl SessionHandle {
    /// Latest committed snapshot.
    pub fn snapshot(&self) -> Session {
        self.snapshots.borrow().clone()
    }
    /// Sends a move and waits for the controller's verdict.
    pub async fn submit(&self, user: ID<Member>, choice: Choice) -> Result<(), GameError> {
        let (reply, verdict) = oneshot::channel();
        self.commands
            .send(Command::Submit {
                user,
                choice,
                reply,
            })
            .map_err(|_| GameError::SessionNotInProgress)?;
        verdict.await.unwrap_or(Err(GameError::SessionNotInProgress))
    }
    /// Sends a concession and waits for the controller's verdict.
    pub async fn forfeit(&self, user: ID<Member>) -> Result<(), GameError> {
        let (reply, verdict) = oneshot::channel();
        self.commands
            .send(Command::Forfeit { user, reply })
            .map_err(|_| GameError::SessionNotInProgress)?;
        verdict.await.unwrap_or(Err(GameError::SessionNotInProgress))
    }
}
