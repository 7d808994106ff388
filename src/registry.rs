use super::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;

/// How long a finished session stays readable before eviction, so clients
/// can render the final result or reconnect mid-celebration.
const RETENTION: Duration = Duration::from_secs(300);

/// Registry of live minigame sessions.
///
/// At most one in-progress session per chat. Sessions are independent
/// actors; the registry only routes commands and reads, so contention is
/// limited to map access.
pub struct Arcade {
    notify: UnboundedSender<StateChange>,
    lobby: RwLock<Lobby>,
}

/// Both maps live under one lock so the one-game-per-chat invariant cannot
/// tear between them.
#[derive(Default)]
struct Lobby {
    sessions: HashMap<ID<Session>, SessionHandle>,
    chats: HashMap<ID<Chat>, ID<Session>>,
}

impl Arcade {
    /// The messaging layer supplies the notification channel and owns its
    /// receiving end.
    pub fn new(notify: UnboundedSender<StateChange>) -> Self {
        Self {
            notify,
            lobby: RwLock::new(Lobby::default()),
        }
    }

    /// Opens a game in the chat. A second start is rejected until the first
    /// session terminates.
    pub async fn start(
        self: &Arc<Self>,
        chat: ID<Chat>,
        initiator: ID<Member>,
        participant: ID<Member>,
        config: GameConfig,
    ) -> Result<ID<Session>, GameError> {
        let mut lobby = self.lobby.write().await;
        if lobby.chats.contains_key(&chat) {
            return Err(GameError::AlreadyInProgress);
        }
        let session = Session::new(chat, initiator, participant, config, SystemTime::now());
        let id = session.id();
        let (handle, finished) = Controller::spawn(session, self.notify.clone());
        lobby.sessions.insert(id, handle);
        lobby.chats.insert(chat, id);
        drop(lobby);
        let arcade = self.clone();
        tokio::spawn(async move {
            let _ = finished.await;
            arcade.release(chat, id).await;
        });
        log::info!("[arcade] opened session {} in chat {}", id, chat);
        Ok(id)
    }

    /// Submits `user`'s move for the current round.
    pub async fn submit_choice(
        &self,
        session: ID<Session>,
        user: ID<Member>,
        choice: Choice,
    ) -> Result<(), GameError> {
        self.handle(session).await?.submit(user, choice).await
    }

    /// Concedes the match on `user`'s behalf.
    pub async fn forfeit(&self, session: ID<Session>, user: ID<Member>) -> Result<(), GameError> {
        self.handle(session).await?.forfeit(user).await
    }

    /// Redacted state as `user` may see it. Served from the latest
    /// committed snapshot; never waits on the command stream.
    pub async fn state(
        &self,
        session: ID<Session>,
        user: ID<Member>,
    ) -> Result<SessionView, GameError> {
        let snapshot = self.handle(session).await?.snapshot();
        Ok(SessionView::of(&snapshot, user))
    }

    /// Unredacted snapshot, for trusted in-process consumers.
    pub async fn find(&self, session: ID<Session>) -> Result<Session, GameError> {
        Ok(self.handle(session).await?.snapshot())
    }

    /// Live session in the chat, if any.
    pub async fn find_active(&self, chat: ID<Chat>) -> Option<ID<Session>> {
        self.lobby.read().await.chats.get(&chat).copied()
    }

    async fn handle(&self, session: ID<Session>) -> Result<SessionHandle, GameError> {
        self.lobby
            .read()
            .await
            .sessions
            .get(&session)
            .cloned()
            .ok_or(GameError::SessionNotFound)
    }

    /// Frees the chat the moment its session terminates, then keeps the
    /// terminal snapshot readable for the retention window.
    async fn release(&self, chat: ID<Chat>, id: ID<Session>) {
        {
            let mut lobby = self.lobby.write().await;
            if lobby.chats.get(&chat) == Some(&id) {
                lobby.chats.remove(&chat);
            }
        }
        log::info!("[arcade] chat {} freed, session {} retained for reads", chat, id);
        tokio::time::sleep(RETENTION).await;
        self.lobby.write().await.sessions.remove(&id);
        log::debug!("[arcade] session {} evicted", id);
    }
}
