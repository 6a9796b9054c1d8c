use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chess::{parse_uci_move, PieceKind, PlayerSide, Position, Square, UciMoveError};

use super::commands::SessionError;
use super::snapshot::SessionSnapshot;
use crate::feedback::{Feedback, FeedbackSink};
use crate::openings::Opening;

const MSG_YOUR_MOVE: &str = "Your move!";
const MSG_CORRECT: &str = "Correct! Next move...";
const MSG_WRONG: &str = "Wrong move, try again!";
const MSG_ILLEGAL: &str = "Illegal move.";
const MSG_AUTO_PLAYED: &str = "Auto played. Your move!";
const MSG_LINE_NOT_LEGAL: &str = "This line isn't legal from the current position.";

/// How a session starts out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub human_side: PlayerSide,
    pub auto_play: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            human_side: PlayerSide::White,
            auto_play: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeStatus {
    InProgress,
    Complete,
}

/// A from/to gesture with an optional promotion choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveAttempt {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveAttempt {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, piece: PieceKind) -> Self {
        self.promotion = Some(piece);
        self
    }
}

/// Parses coordinate text such as `e2e4` or `e7e8n`.
impl FromStr for MoveAttempt {
    type Err = UciMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mv = parse_uci_move(s)?;
        Ok(Self {
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion.map(PieceKind::from),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Accepted {
        san: String,
        move_index: usize,
        completed: bool,
    },
    Rejected(RejectReason),
}

impl MoveOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Not a legal move in the current position.
    IllegalMove,
    /// Legal, but not the next move of the line.
    SequenceMismatch { expected: String, played: String },
    /// The line is already finished.
    SessionComplete,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalMove => f.write_str("illegal move"),
            Self::SequenceMismatch { played, .. } => {
                write!(f, "{} is not the move of this line", played)
            }
            Self::SessionComplete => f.write_str("the line is already complete"),
        }
    }
}

/// Result of one auto-play step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAdvance {
    /// Auto-play is off, stalled, finished, or it is the human's turn.
    NotApplicable,
    Played { san: String, completed: bool },
    /// The expected move cannot be played here. Auto-play stays stalled until
    /// the session is reset, re-sided, toggled or given a new line.
    Stalled { expected: String },
}

/// What `replace_line` did with the session's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// The new line starts with the moves already played.
    Kept,
    Reset,
}

/// The practice state machine. Owned by exactly one actor; every method
/// is synchronous and never blocks.
pub struct PracticeState {
    session_id: String,
    opening_id: String,
    opening_name: String,
    line: Vec<String>,
    position: Position,
    move_index: usize,
    played: Vec<String>,
    last_move: Option<(Square, Square)>,
    human_side: PlayerSide,
    auto_play: bool,
    stalled: bool,
    message: String,
    feedback: Arc<dyn FeedbackSink>,
}

impl PracticeState {
    pub fn from_opening(
        session_id: impl Into<String>,
        opening: &Opening,
        options: SessionOptions,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Result<Self, SessionError> {
        let line = opening.target_sequence();
        if line.is_empty() {
            return Err(SessionError::MalformedOpeningData(opening.id.clone()));
        }
        Ok(Self {
            session_id: session_id.into(),
            opening_id: opening.id.clone(),
            opening_name: opening.name.clone(),
            line,
            position: Position::new(),
            move_index: 0,
            played: Vec::new(),
            last_move: None,
            human_side: options.human_side,
            auto_play: options.auto_play,
            stalled: false,
            message: MSG_YOUR_MOVE.to_string(),
            feedback,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn opening_id(&self) -> &str {
        &self.opening_id
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn move_index(&self) -> usize {
        self.move_index
    }

    pub fn line(&self) -> &[String] {
        &self.line
    }

    pub fn human_side(&self) -> PlayerSide {
        self.human_side
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> PracticeStatus {
        if self.move_index >= self.line.len() {
            PracticeStatus::Complete
        } else {
            PracticeStatus::InProgress
        }
    }

    /// Try a move against a copy of the position; only a move matching the
    /// next SAN of the line is committed.
    pub fn attempt_move(&mut self, attempt: MoveAttempt) -> MoveOutcome {
        if self.status() == PracticeStatus::Complete {
            return MoveOutcome::Rejected(RejectReason::SessionComplete);
        }

        let (next, applied) =
            match self
                .position
                .play_squares(attempt.from, attempt.to, attempt.promotion)
            {
                Ok(played) => played,
                Err(e) => {
                    tracing::debug!(error = %e, "Attempt rejected as illegal");
                    self.message = MSG_ILLEGAL.to_string();
                    return MoveOutcome::Rejected(RejectReason::IllegalMove);
                }
            };

        let expected = &self.line[self.move_index];
        if applied.san != *expected {
            tracing::debug!(
                expected = %expected,
                played = %applied.san,
                "Attempt does not follow the line"
            );
            self.message = MSG_WRONG.to_string();
            self.feedback.emit(Feedback::WrongMove);
            return MoveOutcome::Rejected(RejectReason::SequenceMismatch {
                expected: expected.clone(),
                played: applied.san,
            });
        }

        let san = applied.san.clone();
        self.commit(next, applied.from, applied.to, applied.san);
        let completed = self.finish_ply(MSG_CORRECT);
        tracing::debug!(san = %san, move_index = self.move_index, "Move accepted");
        MoveOutcome::Accepted {
            san,
            move_index: self.move_index,
            completed,
        }
    }

    /// Whether a call to `auto_advance` would do anything.
    pub fn should_auto_advance(&self) -> bool {
        self.auto_play
            && !self.stalled
            && self.status() == PracticeStatus::InProgress
            && self.position.side_to_move() != self.human_side
    }

    /// Play at most one ply of the line for the opponent.
    pub fn auto_advance(&mut self) -> AutoAdvance {
        if !self.should_auto_advance() {
            return AutoAdvance::NotApplicable;
        }

        let expected = self.line[self.move_index].clone();
        match self.position.play_san(&expected) {
            Ok((next, applied)) => {
                let san = applied.san.clone();
                self.commit(next, applied.from, applied.to, applied.san);
                let completed = self.finish_ply(MSG_AUTO_PLAYED);
                tracing::debug!(san = %san, move_index = self.move_index, "Auto played");
                AutoAdvance::Played { san, completed }
            }
            Err(e) => {
                tracing::warn!(expected = %expected, error = %e, "Line is not playable from here");
                self.stalled = true;
                self.message = MSG_LINE_NOT_LEGAL.to_string();
                AutoAdvance::Stalled { expected }
            }
        }
    }

    pub fn set_auto_play(&mut self, enabled: bool) {
        self.auto_play = enabled;
        self.stalled = false;
    }

    /// Change the human's side. Always restarts the line.
    pub fn set_side(&mut self, side: PlayerSide) {
        self.human_side = side;
        self.reset();
    }

    /// Back to the initial position at the start of the line. Side and
    /// auto-play are kept.
    pub fn reset(&mut self) {
        self.position = Position::new();
        self.move_index = 0;
        self.played.clear();
        self.last_move = None;
        self.stalled = false;
        self.message = MSG_YOUR_MOVE.to_string();
    }

    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        self.position.legal_destinations(square)
    }

    /// Swap in an edited line. Progress survives when the new line still
    /// begins with the moves already played.
    pub fn replace_line(
        &mut self,
        name: &str,
        line: Vec<String>,
    ) -> Result<LineChange, SessionError> {
        if line.is_empty() {
            return Err(SessionError::MalformedOpeningData(self.opening_id.clone()));
        }

        let keeps_progress = line.starts_with(&self.line[..self.move_index]);
        let was_complete = self.status() == PracticeStatus::Complete;
        self.opening_name = name.to_string();
        self.line = line;
        self.stalled = false;

        if keeps_progress {
            if self.status() == PracticeStatus::Complete {
                self.message = self.mastered_message();
                if !was_complete {
                    self.feedback.emit(Feedback::Success);
                }
            }
            Ok(LineChange::Kept)
        } else {
            self.reset();
            Ok(LineChange::Reset)
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            opening_id: self.opening_id.clone(),
            opening_name: self.opening_name.clone(),
            fen: self.position.to_fen(),
            side_to_move: self.position.side_to_move(),
            in_check: self.position.is_check(),
            human_side: self.human_side,
            auto_play: self.auto_play,
            move_index: self.move_index,
            total_moves: self.line.len(),
            status: self.status(),
            played: self.played.clone(),
            last_move: self.last_move,
            message: self.message.clone(),
            stalled: self.stalled,
        }
    }

    fn commit(&mut self, next: Position, from: Square, to: Square, san: String) {
        self.position = next;
        self.move_index += 1;
        self.played.push(san);
        self.last_move = Some((from, to));
    }

    /// Emit feedback for a committed ply and update the message. Returns
    /// whether the line is now complete.
    fn finish_ply(&mut self, progress_message: &str) -> bool {
        self.feedback.emit(Feedback::Move);
        if self.status() == PracticeStatus::Complete {
            tracing::info!(opening = %self.opening_name, "Line mastered");
            self.message = self.mastered_message();
            self.feedback.emit(Feedback::Success);
            true
        } else {
            self.message = progress_message.to_string();
            false
        }
    }

    fn mastered_message(&self) -> String {
        format!("You mastered {}!", self.opening_name)
    }
}
