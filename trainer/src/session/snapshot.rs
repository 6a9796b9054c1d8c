use chess::{PlayerSide, Square};

use super::state::PracticeStatus;

/// Complete, immutable view of a practice session.
/// Sent to subscribers on every state change and on subscribe.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub opening_id: String,
    pub opening_name: String,
    pub fen: String,
    pub side_to_move: PlayerSide,
    pub in_check: bool,
    /// Also the board orientation.
    pub human_side: PlayerSide,
    pub auto_play: bool,
    pub move_index: usize,
    pub total_moves: usize,
    pub status: PracticeStatus,
    /// SAN of every ply played so far.
    pub played: Vec<String>,
    pub last_move: Option<(Square, Square)>,
    pub message: String,
    /// Auto-play hit a move it could not play and is waiting for a reset.
    pub stalled: bool,
}

impl SessionSnapshot {
    /// 1-based step shown to the user, capped at the line length.
    pub fn step(&self) -> usize {
        (self.move_index + 1).min(self.total_moves)
    }

    pub fn progress_percent(&self) -> u8 {
        if self.total_moves == 0 {
            return 0;
        }
        (self.move_index * 100 / self.total_moves) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.status == PracticeStatus::Complete
    }

    pub fn is_human_turn(&self) -> bool {
        self.side_to_move == self.human_side
    }
}
