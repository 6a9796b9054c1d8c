use chess::{PlayerSide, Square};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::commands::{SessionCommand, SessionError};
use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;
use super::state::{MoveAttempt, MoveOutcome};

/// Cheap, cloneable handle to a session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: String,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(id: String, cmd_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { id, cmd_tx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn attempt_move(&self, attempt: MoveAttempt) -> Result<MoveOutcome, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::AttemptMove { attempt, reply: tx })
            .await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn set_auto_play(&self, enabled: bool) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::SetAutoPlay { enabled, reply: tx })
            .await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn set_side(&self, side: PlayerSide) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::SetSide { side, reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn reset(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Reset { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn legal_destinations(&self, square: Square) -> Result<Vec<Square>, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::LegalDestinations { square, reply: tx })
            .await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::GetSnapshot { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Current snapshot plus a receiver for every event after it.
    pub async fn subscribe(
        &self,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SessionEvent>), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Subscribe { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }

    /// Resolves once the actor has stopped.
    pub async fn closed(&self) {
        self.cmd_tx.closed().await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::Closed)
    }
}
