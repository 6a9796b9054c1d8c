//! Text rendering of practice state for the terminal.

use chess::{format_square, DisplayBoard, Position, Square};
use trainer::{Feedback, SessionSnapshot};

/// Board, progress line and status message.
pub fn snapshot(snapshot: &SessionSnapshot, marked: &[Square]) -> String {
    let board = match Position::from_fen(&snapshot.fen) {
        Ok(position) => {
            DisplayBoard::from_position(&position).render(snapshot.human_side, marked)
        }
        Err(e) => format!("<unreadable position: {}>", e),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "{}  step {}/{} ({}%)  you: {}  auto-play: {}\n",
        snapshot.opening_name,
        snapshot.step(),
        snapshot.total_moves,
        snapshot.progress_percent(),
        snapshot.human_side,
        if snapshot.auto_play { "on" } else { "off" },
    ));
    out.push_str(&board);
    out.push('\n');
    if !snapshot.played.is_empty() {
        out.push_str(&format!("Line: {}\n", move_text(&snapshot.played)));
    }
    if let Some((from, to)) = snapshot.last_move {
        out.push_str(&format!("Last move: {}{}\n", format_square(from), format_square(to)));
    }
    out.push_str(&snapshot.message);
    if snapshot.in_check && !snapshot.is_complete() {
        out.push_str(" (check)");
    }
    out
}

/// Numbered move text: `1. e4 e5 2. Nf3`.
pub fn move_text(moves: &[String]) -> String {
    moves
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| format!("{}. {}", i + 1, pair.join(" ")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Terminal stand-in for a sound cue.
pub fn feedback(feedback: Feedback) -> Option<&'static str> {
    match feedback {
        Feedback::Move => None,
        Feedback::WrongMove => Some("\x07"),
        Feedback::Success => Some("*** Line complete ***"),
    }
}

pub fn destinations(from: Square, targets: &[Square]) -> String {
    if targets.is_empty() {
        return format!("No legal moves from {}.", format_square(from));
    }
    let list: Vec<String> = targets.iter().map(|sq| format_square(*sq)).collect();
    format!("{} can go to: {}", format_square(from), list.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::PlayerSide;
    use trainer::PracticeStatus;

    fn snap() -> SessionSnapshot {
        SessionSnapshot {
            session_id: "s".to_string(),
            opening_id: "ruy-lopez".to_string(),
            opening_name: "Ruy Lopez".to_string(),
            fen: "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2".to_string(),
            side_to_move: PlayerSide::White,
            in_check: false,
            human_side: PlayerSide::White,
            auto_play: true,
            move_index: 2,
            total_moves: 5,
            status: PracticeStatus::InProgress,
            played: vec!["e4".to_string(), "e5".to_string()],
            last_move: Some((Square::E7, Square::E5)),
            message: "Auto played. Your move!".to_string(),
            stalled: false,
        }
    }

    #[test]
    fn test_snapshot_text() {
        let text = snapshot(&snap(), &[]);
        assert!(text.starts_with("Ruy Lopez  step 3/5 (40%)  you: white  auto-play: on\n"));
        assert!(text.contains("8  r n b q k b n r"));
        assert!(text.contains("Line: 1. e4 e5\n"));
        assert!(text.contains("Last move: e7e5\n"));
        assert!(text.ends_with("Auto played. Your move!"));
    }

    #[test]
    fn test_black_orientation_puts_rank_one_on_top() {
        let mut s = snap();
        s.human_side = PlayerSide::Black;
        let text = snapshot(&s, &[]);
        let first_rank_line = text.lines().nth(1).unwrap();
        assert!(first_rank_line.starts_with("1 "), "{}", first_rank_line);
    }

    #[test]
    fn test_move_text() {
        let moves: Vec<String> = ["e4", "c5", "Nf3"].iter().map(|m| m.to_string()).collect();
        assert_eq!(move_text(&moves), "1. e4 c5 2. Nf3");
        assert_eq!(move_text(&[]), "");
    }

    #[test]
    fn test_destinations() {
        assert_eq!(
            destinations(Square::G1, &[Square::F3, Square::H3]),
            "g1 can go to: f3 h3"
        );
        assert_eq!(destinations(Square::E4, &[]), "No legal moves from e4.");
    }
}
