//! Chess rules adapter over cozy-chess: value-typed positions, square and
//! move text, SAN and single-game PGN move text.

pub mod board_display;
pub mod converters;
pub mod fen;
pub mod pgn;
pub mod position;
pub mod types;
pub mod uci;

pub use board_display::DisplayBoard;
pub use converters::*;
pub use fen::{FenError, STARTING_FEN};
pub use pgn::{format_san, parse_pgn, parse_san, GameResult, PgnError, PgnGame, PgnMove, SanError};
pub use position::{AppliedMove, LegalMove, Position, RulesError};
pub use types::{PieceKind, PlayerSide};
pub use uci::{convert_uci_castling_to_cozy, format_uci_move, parse_uci_move, UciMoveError};

pub use cozy_chess::{GameStatus, Move, Square};
