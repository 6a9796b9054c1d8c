//! Standard Algebraic Notation (SAN) for cozy-chess moves.
//!
//! cozy-chess encodes castling as the king capturing its own rook; both
//! directions of the conversion treat that encoding as `O-O` / `O-O-O`.

use cozy_chess::{Board, File, GameStatus, Move, Piece, Rank};

use crate::converters::{
    char_to_file, char_to_rank, file_to_char, format_piece_upper, format_square, parse_piece,
    parse_square, rank_to_char,
};

/// Parse a Standard Algebraic Notation (SAN) move against `board`.
///
/// Trailing check, mate and annotation marks are ignored, castling may be
/// spelled with zeros, and a promotion may omit the `=`.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let body = san
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    if body.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let legal = legal_moves(board);
    let candidates: Vec<Move> = match body {
        "O-O" | "0-0" => legal
            .into_iter()
            .filter(|mv| castling_san(board, *mv) == Some("O-O"))
            .collect(),
        "O-O-O" | "0-0-0" => legal
            .into_iter()
            .filter(|mv| castling_san(board, *mv) == Some("O-O-O"))
            .collect(),
        _ => {
            let spec = SanSpec::parse(body, san)?;
            legal
                .into_iter()
                .filter(|mv| spec.matches(board, *mv))
                .collect()
        }
    };

    match candidates.as_slice() {
        [] => Err(SanError::NoLegalMove(san.to_string())),
        [mv] => Ok(*mv),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

/// Format a legal move as SAN, including the `+` / `#` suffix.
///
/// `mv` must be legal on `board`.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = san_body(board, mv);

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if after.status() == GameStatus::Won {
            '#'
        } else {
            '+'
        });
    }

    san
}

/// `Some("O-O")` / `Some("O-O-O")` when `mv` is a castling move in
/// cozy-chess's king-takes-rook encoding.
pub fn castling_san(board: &Board, mv: Move) -> Option<&'static str> {
    if board.piece_on(mv.from) != Some(Piece::King) {
        return None;
    }
    let own = board.color_on(mv.from)?;
    if board.color_on(mv.to) != Some(own) {
        return None;
    }
    if mv.to.file() as u8 > mv.from.file() as u8 {
        Some("O-O")
    } else {
        Some("O-O-O")
    }
}

/// True when `mv` removes an enemy piece, en passant included.
pub fn is_capture(board: &Board, mv: Move) -> bool {
    let mover = board.side_to_move();
    if board.color_on(mv.to) == Some(!mover) {
        return true;
    }
    board.piece_on(mv.from) == Some(Piece::Pawn)
        && mv.from.file() != mv.to.file()
        && board.piece_on(mv.to).is_none()
}

pub(crate) fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

fn san_body(board: &Board, mv: Move) -> String {
    if let Some(castle) = castling_san(board, mv) {
        return castle.to_string();
    }
    let Some(piece) = board.piece_on(mv.from) else {
        return crate::uci::format_uci_move(mv);
    };

    let capture = is_capture(board, mv);
    let mut san = String::new();

    if piece == Piece::Pawn {
        if capture {
            san.push(file_to_char(mv.from.file()));
        }
    } else {
        san.push(format_piece_upper(piece));
        san.push_str(&disambiguation(board, mv, piece));
    }

    if capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(format_piece_upper(promo));
    }

    san
}

/// Minimal origin qualifier: file if it is unique among rivals, else rank,
/// else both.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<_> = legal_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && board.piece_on(other.from) == Some(piece)
                && castling_san(board, *other).is_none()
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
        file_to_char(mv.from.file()).to_string()
    } else if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
        rank_to_char(mv.from.rank()).to_string()
    } else {
        format_square(mv.from)
    }
}

/// Decomposed non-castling SAN token.
struct SanSpec {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: cozy_chess::Square,
    promotion: Option<Piece>,
}

impl SanSpec {
    fn parse(body: &str, original: &str) -> Result<Self, SanError> {
        let mut chars: Vec<char> = body.chars().collect();

        let piece = match chars.first() {
            Some(&c) if matches!(c, 'N' | 'B' | 'R' | 'Q' | 'K') => {
                chars.remove(0);
                parse_piece(c).unwrap_or(Piece::Pawn)
            }
            _ => Piece::Pawn,
        };

        let mut promotion = None;
        if let Some(eq) = chars.iter().position(|c| *c == '=') {
            let promo = match &chars[eq + 1..] {
                [c] => promotion_piece(*c),
                _ => None,
            };
            promotion =
                Some(promo.ok_or_else(|| SanError::InvalidPromotion(original.to_string()))?);
            chars.truncate(eq);
        } else if piece == Piece::Pawn {
            if let Some(&last) = chars.last() {
                if matches!(last, 'Q' | 'R' | 'B' | 'N') {
                    promotion = promotion_piece(last);
                    chars.pop();
                }
            }
        }

        chars.retain(|c| !matches!(c, 'x' | ':'));
        if chars.len() < 2 || chars.len() > 4 {
            return Err(SanError::InvalidFormat(original.to_string()));
        }

        let split = chars.len() - 2;
        let dest: String = chars[split..].iter().collect();
        let to = parse_square(&dest).ok_or(SanError::InvalidSquare(dest))?;

        let mut from_file = None;
        let mut from_rank = None;
        for &c in &chars[..split] {
            if let Some(file) = char_to_file(c) {
                if from_file.replace(file).is_some() {
                    return Err(SanError::InvalidFile(c));
                }
            } else if let Some(rank) = char_to_rank(c) {
                if from_rank.replace(rank).is_some() {
                    return Err(SanError::InvalidRank(c));
                }
            } else {
                return Err(SanError::InvalidFormat(original.to_string()));
            }
        }

        Ok(Self {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }

    fn matches(&self, board: &Board, mv: Move) -> bool {
        board.piece_on(mv.from) == Some(self.piece)
            && castling_san(board, mv).is_none()
            && mv.to == self.to
            && mv.promotion == self.promotion
            && self.from_file.is_none_or(|f| mv.from.file() == f)
            && self.from_rank.is_none_or(|r| mv.from.rank() == r)
    }
}

fn promotion_piece(c: char) -> Option<Piece> {
    match parse_piece(c)? {
        p @ (Piece::Queen | Piece::Rook | Piece::Bishop | Piece::Knight) => Some(p),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid file: {0}")]
    InvalidFile(char),
    #[error("Invalid rank: {0}")]
    InvalidRank(char),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::parse_uci_move;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    fn san_of(fen: &str, uci: &str) -> String {
        let b = board(fen);
        let mv = crate::uci::convert_uci_castling_to_cozy(
            parse_uci_move(uci).unwrap(),
            &legal_moves(&b),
        );
        format_san(&b, mv)
    }

    #[test]
    fn test_pawn_and_piece_moves_from_start() {
        let b = Board::default();
        assert_eq!(format_san(&b, parse_uci_move("e2e4").unwrap()), "e4");
        assert_eq!(format_san(&b, parse_uci_move("g1f3").unwrap()), "Nf3");
    }

    #[test]
    fn test_castling_both_sides() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san_of(fen, "e1g1"), "O-O");
        assert_eq!(san_of(fen, "e1c1"), "O-O-O");
    }

    #[test]
    fn test_file_disambiguation() {
        // Knights on b1 and f3 can both reach d2.
        let fen = "4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1";
        assert_eq!(san_of(fen, "b1d2"), "Nbd2");
        assert_eq!(san_of(fen, "f3d2"), "Nfd2");
    }

    #[test]
    fn test_rank_disambiguation() {
        // Rooks on a1 and a5 both reach a3.
        let fen = "4k3/8/8/R7/8/8/8/R3K3 w - - 0 1";
        assert_eq!(san_of(fen, "a1a3"), "R1a3");
        assert_eq!(san_of(fen, "a5a3"), "R5a3");
    }

    #[test]
    fn test_pawn_capture_and_en_passant() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
        assert_eq!(san_of(fen, "e5d6"), "exd6");
        let b = board(fen);
        assert!(is_capture(&b, parse_uci_move("e5d6").unwrap()));
    }

    #[test]
    fn test_promotion_and_check_suffix() {
        let fen = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        assert_eq!(san_of(fen, "a7a8q"), "a8=Q+");
        assert_eq!(san_of(fen, "a7a8n"), "a8=N");
    }

    #[test]
    fn test_checkmate_suffix() {
        // Fool's mate: 1. f3 e5 2. g4 Qh4#
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";
        assert_eq!(san_of(fen, "d8h4"), "Qh4#");
    }

    #[test]
    fn test_parse_simple_and_annotated() {
        let b = Board::default();
        assert_eq!(parse_san(&b, "e4").unwrap(), parse_uci_move("e2e4").unwrap());
        assert_eq!(parse_san(&b, "Nf3!?").unwrap(), parse_uci_move("g1f3").unwrap());
    }

    #[test]
    fn test_parse_castling_with_zeros() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let mv = parse_san(&b, "0-0").unwrap();
        assert_eq!(castling_san(&b, mv), Some("O-O"));
        let mv = parse_san(&b, "O-O-O+").unwrap();
        assert_eq!(castling_san(&b, mv), Some("O-O-O"));
    }

    #[test]
    fn test_parse_promotion_without_equals() {
        let b = board("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(
            parse_san(&b, "a8Q").unwrap(),
            parse_uci_move("a7a8q").unwrap()
        );
        assert_eq!(
            parse_san(&b, "a8=N").unwrap(),
            parse_uci_move("a7a8n").unwrap()
        );
    }

    #[test]
    fn test_parse_errors() {
        let b = Board::default();
        assert!(matches!(parse_san(&b, ""), Err(SanError::InvalidFormat(_))));
        assert!(matches!(parse_san(&b, "e5"), Err(SanError::NoLegalMove(_))));
        assert!(matches!(parse_san(&b, "Nz9"), Err(SanError::InvalidSquare(_))));
        assert!(matches!(
            parse_san(&b, "hello"),
            Err(SanError::InvalidFormat(_))
        ));

        let knights = board("4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1");
        assert!(matches!(
            parse_san(&knights, "Nd2"),
            Err(SanError::AmbiguousMove(_))
        ));
        assert!(parse_san(&knights, "Nbd2").is_ok());
    }
}
