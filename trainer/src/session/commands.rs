use chess::{PlayerSide, Square};
use tokio::sync::{broadcast, oneshot};

use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;
use super::state::{MoveAttempt, MoveOutcome};
use crate::openings::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session is closed")]
    Closed,
    #[error("A newer opening was requested before this one finished loading")]
    Superseded,
    #[error("Opening not found: {0}")]
    OpeningNotFound(String),
    #[error("Opening {0} has no playable moves")]
    MalformedOpeningData(String),
    #[error("Opening store error: {0}")]
    Store(String),
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::OpeningNotFound(id),
            other => Self::Store(other.to_string()),
        }
    }
}

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
/// There is no command for auto-play moves; the actor plays them on its own
/// tick.
pub enum SessionCommand {
    AttemptMove {
        attempt: MoveAttempt,
        reply: oneshot::Sender<MoveOutcome>,
    },
    SetAutoPlay {
        enabled: bool,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    SetSide {
        side: PlayerSide,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Reset {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    LegalDestinations {
        square: Square,
        reply: oneshot::Sender<Vec<Square>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
