use cozy_chess::{Board, GameStatus, Move, Piece, Square};

use crate::converters::{format_square, promotion_rank};
use crate::fen::{format_fen, parse_fen, FenError};
use crate::pgn::san::{castling_san, format_san, is_capture, legal_moves, parse_san, SanError};
use crate::types::{PieceKind, PlayerSide};
use crate::uci::{convert_uci_castling_to_cozy, format_uci_move};

/// Immutable chess position. Applying a move yields a new `Position`;
/// the receiver is never modified.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
}

/// Result of applying one legal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    pub from: Square,
    /// Destination as a player sees it; for castling this is the king's
    /// landing square, not the rook's.
    pub to: Square,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub san: String,
    pub uci: String,
}

/// A legal move from a given square, for highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub san: String,
}

impl Position {
    /// The standard starting position
    pub fn new() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self {
            board: parse_fen(fen)?,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> PlayerSide {
        self.board.side_to_move().into()
    }

    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    pub fn is_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    pub fn to_fen(&self) -> String {
        format_fen(&self.board)
    }

    pub fn piece_at(&self, square: Square) -> Option<(PieceKind, PlayerSide)> {
        let piece = self.board.piece_on(square)?;
        let color = self.board.color_on(square)?;
        Some((piece.into(), color.into()))
    }

    /// All legal moves in cozy-chess encoding.
    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.board)
    }

    /// Legal moves of the piece on `from`, with display destinations.
    pub fn legal_moves_from(&self, from: Square) -> Vec<LegalMove> {
        self.legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from)
            .map(|mv| LegalMove {
                from,
                to: self.display_target(mv),
                captured: self.captured_piece(mv),
                promotion: mv.promotion.map(PieceKind::from),
                san: format_san(&self.board, mv),
            })
            .collect()
    }

    /// Squares the piece on `from` can legally reach. Empty when the square
    /// is empty or the piece is stuck.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut targets: Vec<Square> = self
            .legal_moves_from(from)
            .into_iter()
            .map(|mv| mv.to)
            .collect();
        targets.sort_by_key(|sq| *sq as usize);
        targets.dedup();
        targets
    }

    /// Play a from/to gesture.
    ///
    /// A pawn reaching its last rank promotes to `promotion`, or a queen when
    /// no choice is given; the choice is ignored for any other move. Castling
    /// is played with the king's two-square gesture; dropping the king onto
    /// its own rook is illegal.
    pub fn play_squares(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<(Position, AppliedMove), RulesError> {
        let piece = self
            .board
            .piece_on(from)
            .ok_or_else(|| RulesError::NoPieceOnSquare(format_square(from)))?;
        let color = self
            .board
            .color_on(from)
            .ok_or_else(|| RulesError::NoPieceOnSquare(format_square(from)))?;
        if color != self.board.side_to_move() {
            return Err(RulesError::WrongSideToMove(format_square(from)));
        }

        let promotion = if piece == Piece::Pawn && to.rank() == promotion_rank(color) {
            Some(promotion.map(Piece::from).unwrap_or(Piece::Queen))
        } else {
            None
        };

        let legal = self.legal_moves();
        let mut mv = Move {
            from,
            to,
            promotion,
        };
        if piece == Piece::King {
            mv = convert_uci_castling_to_cozy(mv, &legal);
        }

        if !legal.contains(&mv) || self.display_target(mv) != to {
            return Err(RulesError::IllegalMove(format_uci_move(mv)));
        }

        Ok(self.apply(mv))
    }

    /// Play a move given in SAN.
    pub fn play_san(&self, san: &str) -> Result<(Position, AppliedMove), RulesError> {
        let mv = parse_san(&self.board, san).map_err(RulesError::Unparseable)?;
        Ok(self.apply(mv))
    }

    /// `mv` must already be known to be legal.
    fn apply(&self, mv: Move) -> (Position, AppliedMove) {
        let piece = self.board.piece_on(mv.from).map(PieceKind::from);
        let applied = AppliedMove {
            mv,
            from: mv.from,
            to: self.display_target(mv),
            piece: piece.unwrap_or(PieceKind::Pawn),
            captured: self.captured_piece(mv),
            promotion: mv.promotion.map(PieceKind::from),
            san: format_san(&self.board, mv),
            uci: format_uci_move(mv),
        };

        let mut board = self.board.clone();
        board.play_unchecked(mv);
        (Position { board }, applied)
    }

    fn display_target(&self, mv: Move) -> Square {
        match castling_san(&self.board, mv) {
            Some("O-O") => Square::new(cozy_chess::File::G, mv.from.rank()),
            Some(_) => Square::new(cozy_chess::File::C, mv.from.rank()),
            None => mv.to,
        }
    }

    fn captured_piece(&self, mv: Move) -> Option<PieceKind> {
        if !is_capture(&self.board, mv) {
            return None;
        }
        Some(
            self.board
                .piece_on(mv.to)
                .map(PieceKind::from)
                .unwrap_or(PieceKind::Pawn),
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

/// Two positions are equal when their FEN records are identical.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.to_fen() == other.to_fen()
    }
}

impl Eq for Position {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("No piece on {0}")]
    NoPieceOnSquare(String),
    #[error("Piece on {0} does not belong to the side to move")]
    WrongSideToMove(String),
    #[error("Unplayable notation: {0}")]
    Unparseable(#[from] SanError),
}
