//! UCI-style coordinate move text ("e2e4", "e7e8q").

use cozy_chess::{File, Move, Piece, Rank, Square};

use crate::converters::{format_piece, format_square, parse_piece, parse_square};

/// Convert the king's two-square castling gesture to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// The converted move is only returned when it is in `legal_moves`; anything
/// else comes back unchanged.
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_rank_1_or_8 && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let rook_file = match mv.to.file() {
            File::G => File::H,
            _ => File::A,
        };
        let converted = Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        };

        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

/// Parse coordinate move text. Accepts an optional separator between the
/// squares ("e2e4", "e2-e4", "e2 e4") and a trailing promotion letter.
pub fn parse_uci_move(s: &str) -> Result<Move, UciMoveError> {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if !(4..=5).contains(&compact.len()) || !compact.is_ascii() {
        return Err(UciMoveError::InvalidFormat(s.to_string()));
    }

    let from =
        parse_square(&compact[0..2]).ok_or_else(|| UciMoveError::InvalidSquare(s.to_string()))?;
    let to =
        parse_square(&compact[2..4]).ok_or_else(|| UciMoveError::InvalidSquare(s.to_string()))?;

    let promotion = match compact[4..].chars().next() {
        None => None,
        Some(c) => match parse_piece(c) {
            Some(p @ (Piece::Queen | Piece::Rook | Piece::Bishop | Piece::Knight)) => Some(p),
            _ => return Err(UciMoveError::InvalidPromotion(s.to_string())),
        },
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UciMoveError {
    #[error("Invalid move text: {0}")]
    InvalidFormat(String),
    #[error("Invalid square in move: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion in move: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uci_move() {
        let mv = Move {
            from: Square::new(File::E, Rank::Second),
            to: Square::new(File::E, Rank::Fourth),
            promotion: None,
        };
        assert_eq!(format_uci_move(mv), "e2e4");
    }

    #[test]
    fn test_format_uci_move_with_promotion() {
        let mv = Move {
            from: Square::new(File::E, Rank::Seventh),
            to: Square::new(File::E, Rank::Eighth),
            promotion: Some(Piece::Queen),
        };
        assert_eq!(format_uci_move(mv), "e7e8q");
    }

    #[test]
    fn test_parse_uci_move_variants() {
        let expected = Move {
            from: Square::new(File::E, Rank::Second),
            to: Square::new(File::E, Rank::Fourth),
            promotion: None,
        };
        assert_eq!(parse_uci_move("e2e4").unwrap(), expected);
        assert_eq!(parse_uci_move("e2-e4").unwrap(), expected);
        assert_eq!(parse_uci_move(" e2 e4 ").unwrap(), expected);
        assert_eq!(
            parse_uci_move("a7a8n").unwrap().promotion,
            Some(Piece::Knight)
        );
    }

    #[test]
    fn test_parse_uci_move_errors() {
        assert!(matches!(
            parse_uci_move("e2"),
            Err(UciMoveError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_uci_move("z2e4"),
            Err(UciMoveError::InvalidSquare(_))
        ));
        assert!(matches!(
            parse_uci_move("e7e8k"),
            Err(UciMoveError::InvalidPromotion(_))
        ));
    }

    #[test]
    fn test_castling_conversion_requires_legality() {
        let white_short = Move {
            from: Square::new(File::E, Rank::First),
            to: Square::new(File::G, Rank::First),
            promotion: None,
        };
        let cozy_short = Move {
            from: Square::new(File::E, Rank::First),
            to: Square::new(File::H, Rank::First),
            promotion: None,
        };
        assert_eq!(
            convert_uci_castling_to_cozy(white_short, &[cozy_short]),
            cozy_short
        );
        assert_eq!(convert_uci_castling_to_cozy(white_short, &[]), white_short);
    }
}
