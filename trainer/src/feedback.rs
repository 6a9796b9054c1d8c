//! Fire-and-forget feedback signals (sounds, toasts) raised by a session.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::session::SessionEvent;

/// A discrete feedback signal. How it is rendered (audio, text) is up to the
/// host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// A move was accepted or auto-played.
    Move,
    /// A legal move that is not the next move of the line.
    WrongMove,
    /// The whole line has been played.
    Success,
}

impl Feedback {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::WrongMove => "wrong",
            Self::Success => "success",
        }
    }
}

/// Receiver of feedback signals.
///
/// `emit` must not block and must not fail: an unavailable output (muted
/// audio, no listeners) is silently ignored and never affects session state.
pub trait FeedbackSink: Send + Sync {
    fn emit(&self, feedback: Feedback);
}

/// Forwards feedback into a session's event channel.
#[derive(Debug, Clone)]
pub struct ChannelFeedback {
    tx: broadcast::Sender<SessionEvent>,
}

impl ChannelFeedback {
    pub fn new(tx: broadcast::Sender<SessionEvent>) -> Self {
        Self { tx }
    }
}

impl FeedbackSink for ChannelFeedback {
    fn emit(&self, feedback: Feedback) {
        tracing::debug!(feedback = feedback.as_str(), "Feedback");
        // No subscribers is fine.
        let _ = self.tx.send(SessionEvent::Feedback(feedback));
    }
}

/// Keeps every signal in memory; meant for tests and headless hosts.
#[derive(Debug, Default, Clone)]
pub struct RecordingFeedback {
    events: Arc<Mutex<Vec<Feedback>>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Feedback> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn emit(&self, feedback: Feedback) {
        if let Ok(mut events) = self.events.lock() {
            events.push(feedback);
        }
    }
}

impl<T: FeedbackSink + ?Sized> FeedbackSink for Arc<T> {
    fn emit(&self, feedback: Feedback) {
        (**self).emit(feedback)
    }
}
