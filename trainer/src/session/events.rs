use super::snapshot::SessionSnapshot;
use crate::feedback::Feedback;

/// Events broadcast from the session actor to all subscribers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Full state snapshot after any mutation.
    StateChanged(SessionSnapshot),
    /// Sound-style signal for the host to render.
    Feedback(Feedback),
    /// Non-fatal problem worth showing, e.g. a line that cannot be auto-played.
    Warning(String),
    /// The opening was deleted from its store; the session has stopped.
    OpeningRemoved(String),
}
