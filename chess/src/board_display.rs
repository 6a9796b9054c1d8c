//! Plain-text board rendering for terminal hosts.

use cozy_chess::Square;

use crate::converters::{char_to_file, char_to_rank};
use crate::position::Position;
use crate::types::{PieceKind, PlayerSide};

/// An 8x8 board for display purposes only.
#[derive(Debug, Clone, Default)]
pub struct DisplayBoard {
    squares: [[Option<(PieceKind, PlayerSide)>; 8]; 8],
}

impl DisplayBoard {
    pub fn from_position(position: &Position) -> Self {
        let mut squares = [[None; 8]; 8];
        for (rank_idx, rank_char) in ('1'..='8').enumerate() {
            for (file_idx, file_char) in ('a'..='h').enumerate() {
                if let (Some(file), Some(rank)) = (char_to_file(file_char), char_to_rank(rank_char))
                {
                    squares[rank_idx][file_idx] = position.piece_at(Square::new(file, rank));
                }
            }
        }
        Self { squares }
    }

    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PlayerSide)> {
        if file > 7 || rank > 7 {
            return None;
        }
        self.squares[rank as usize][file as usize]
    }

    /// Render with `orientation` at the bottom. White pieces are uppercase,
    /// black lowercase, empty squares `.`; squares in `marked` show `*` when
    /// empty.
    pub fn render(&self, orientation: PlayerSide, marked: &[Square]) -> String {
        let ranks: Vec<u8> = match orientation {
            PlayerSide::White => (0..8).rev().collect(),
            PlayerSide::Black => (0..8).collect(),
        };
        let files: Vec<u8> = match orientation {
            PlayerSide::White => (0..8).collect(),
            PlayerSide::Black => (0..8).rev().collect(),
        };

        let mut out = String::new();
        for &rank in &ranks {
            out.push_str(&format!("{} ", rank + 1));
            for &file in &files {
                let cell = match self.piece_at(file, rank) {
                    Some((kind, PlayerSide::White)) => kind.to_char_upper(),
                    Some((kind, PlayerSide::Black)) => kind.to_char_upper().to_ascii_lowercase(),
                    None if is_marked(marked, file, rank) => '*',
                    None => '.',
                };
                out.push(' ');
                out.push(cell);
            }
            out.push('\n');
        }
        out.push_str("  ");
        for &file in &files {
            out.push(' ');
            out.push((b'a' + file) as char);
        }
        out.push('\n');
        out
    }
}

fn is_marked(marked: &[Square], file: u8, rank: u8) -> bool {
    marked
        .iter()
        .any(|sq| sq.file() as u8 == file && sq.rank() as u8 == rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::parse_square;

    #[test]
    fn test_start_position_white_orientation() {
        let board = DisplayBoard::from_position(&Position::new());
        let text = board.render(PlayerSide::White, &[]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }

    #[test]
    fn test_black_orientation_and_marks() {
        let board = DisplayBoard::from_position(&Position::new());
        let marks = [parse_square("e4").unwrap()];
        let text = board.render(PlayerSide::Black, &marks);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1  R N B K Q B N R");
        assert_eq!(lines[3], "4  . . . * . . . .");
        assert_eq!(lines[8], "   h g f e d c b a");
    }
}
