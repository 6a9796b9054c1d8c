//! Strict parser for a single PGN game's tags and move text.
//!
//! Every move is replayed from the standard starting position, so a
//! successful parse is always a legal line. Variations are skipped.

use cozy_chess::{Board, Move};
use std::collections::HashMap;

use super::san::{format_san, parse_san, SanError};

/// A parsed PGN game
#[derive(Debug, Clone)]
pub struct PgnGame {
    pub tags: HashMap<String, String>,
    pub moves: Vec<PgnMove>,
    pub result: GameResult,
}

/// A single move in PGN with metadata
#[derive(Debug, Clone)]
pub struct PgnMove {
    pub mv: Move,
    /// Canonical SAN as produced by [`format_san`], not the source spelling.
    pub san: String,
    pub comment: Option<String>,
    pub nags: Vec<u8>, // Numeric Annotation Glyphs (!!, ?, etc.)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl PgnGame {
    /// The game's moves as a flat list of SAN strings.
    pub fn san_moves(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.san.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Tag(String, String),
    Comment(String),
    VariationStart,
    VariationEnd,
    Nag(u8),
    Result(GameResult),
    MoveNumber,
    San(String, Option<u8>),
}

/// Parse a PGN string into a game
pub fn parse_pgn(input: &str) -> Result<PgnGame, PgnError> {
    let tokens = tokenize(input)?;

    let mut board = Board::default();
    let mut game = PgnGame {
        tags: HashMap::new(),
        moves: Vec::new(),
        result: GameResult::Ongoing,
    };
    let mut depth = 0usize;

    for token in tokens {
        match token {
            Token::VariationStart => depth += 1,
            Token::VariationEnd => {
                depth = depth.checked_sub(1).ok_or(PgnError::UnbalancedVariation)?;
            }
            _ if depth > 0 => {}
            Token::Tag(name, value) => {
                game.tags.insert(name, value);
            }
            Token::Comment(text) => {
                if let Some(last) = game.moves.last_mut() {
                    if last.comment.is_none() && !text.is_empty() {
                        last.comment = Some(text);
                    }
                }
            }
            Token::Nag(nag) => {
                if let Some(last) = game.moves.last_mut() {
                    last.nags.push(nag);
                }
            }
            Token::Result(result) => game.result = result,
            Token::MoveNumber => {}
            Token::San(text, suffix_nag) => {
                let mv = parse_san(&board, &text).map_err(|source| PgnError::InvalidMove {
                    ply: game.moves.len() + 1,
                    san: text.clone(),
                    source,
                })?;
                let san = format_san(&board, mv);
                board.play_unchecked(mv);
                game.moves.push(PgnMove {
                    mv,
                    san,
                    comment: None,
                    nags: suffix_nag.into_iter().collect(),
                });
            }
        }
    }

    if depth != 0 {
        return Err(PgnError::UnbalancedVariation);
    }

    Ok(game)
}

fn tokenize(input: &str) -> Result<Vec<Token>, PgnError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '[' => {
                chars.next();
                let body = take_until(&mut chars, ']').ok_or(PgnError::UnterminatedTag)?;
                let (name, value) = parse_tag(&body)?;
                tokens.push(Token::Tag(name, value));
            }
            '{' => {
                chars.next();
                let body = take_until(&mut chars, '}').ok_or(PgnError::UnterminatedComment)?;
                tokens.push(Token::Comment(body.trim().to_string()));
            }
            ';' => {
                chars.next();
                let body = take_until(&mut chars, '\n').unwrap_or_default();
                tokens.push(Token::Comment(body.trim().to_string()));
            }
            '(' => {
                chars.next();
                tokens.push(Token::VariationStart);
            }
            ')' => {
                chars.next();
                tokens.push(Token::VariationEnd);
            }
            '$' => {
                chars.next();
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                let nag = digits
                    .parse()
                    .map_err(|_| PgnError::InvalidNag(format!("${digits}")))?;
                tokens.push(Token::Nag(nag));
            }
            _ => {
                let mut symbol = String::new();
                while let Some(&s) = chars.peek() {
                    if s.is_whitespace() || "[]{}();$".contains(s) {
                        break;
                    }
                    symbol.push(s);
                    chars.next();
                }
                classify_symbol(&symbol, &mut tokens);
            }
        }
    }

    Ok(tokens)
}

/// Consume characters up to (and including) `end`. `None` if input runs out.
fn take_until(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, end: char) -> Option<String> {
    let mut body = String::new();
    for c in chars.by_ref() {
        if c == end {
            return Some(body);
        }
        body.push(c);
    }
    None
}

fn parse_tag(body: &str) -> Result<(String, String), PgnError> {
    let body = body.trim();
    let (name, rest) = body
        .split_once(char::is_whitespace)
        .ok_or_else(|| PgnError::InvalidTag(body.to_string()))?;
    let rest = rest.trim();
    let value = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .ok_or_else(|| PgnError::InvalidTag(body.to_string()))?;
    Ok((name.to_string(), value.replace("\\\"", "\"")))
}

fn classify_symbol(symbol: &str, tokens: &mut Vec<Token>) {
    match symbol {
        "1-0" => return tokens.push(Token::Result(GameResult::WhiteWins)),
        "0-1" => return tokens.push(Token::Result(GameResult::BlackWins)),
        "1/2-1/2" => return tokens.push(Token::Result(GameResult::Draw)),
        "*" => return tokens.push(Token::Result(GameResult::Ongoing)),
        _ => {}
    }

    // Move numbers: "12." / "12..." possibly glued to the move ("1.e4").
    let digits = symbol.chars().take_while(char::is_ascii_digit).count();
    let rest = &symbol[digits..];
    let san = if digits > 0 && (rest.is_empty() || rest.starts_with('.')) {
        tokens.push(Token::MoveNumber);
        rest.trim_start_matches('.')
    } else {
        symbol
    };

    if san.is_empty() {
        return;
    }

    let body = san.trim_end_matches(|c| c == '!' || c == '?');
    let nag = suffix_nag(&san[body.len()..]);
    tokens.push(Token::San(body.to_string(), nag));
}

fn suffix_nag(suffix: &str) -> Option<u8> {
    match suffix {
        "!" => Some(1),
        "?" => Some(2),
        "!!" => Some(3),
        "??" => Some(4),
        "!?" => Some(5),
        "?!" => Some(6),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PgnError {
    #[error("Unterminated comment")]
    UnterminatedComment,
    #[error("Unterminated tag pair")]
    UnterminatedTag,
    #[error("Invalid tag: {0}")]
    InvalidTag(String),
    #[error("Invalid NAG: {0}")]
    InvalidNag(String),
    #[error("Unbalanced variation parentheses")]
    UnbalancedVariation,
    #[error("Move {ply} ({san}) is not playable: {source}")]
    InvalidMove {
        ply: usize,
        san: String,
        #[source]
        source: SanError,
    },
}
