//! Turns stored opening notation into the flat SAN list a session plays.

use chess::parse_pgn;

/// Extract the ordered move list from free-form notation. Never fails.
///
/// Notation that replays cleanly is returned as canonical SAN. Anything else
/// goes through best-effort token extraction, which may keep tokens that are
/// not legal moves; a session treats those as ordinary mismatches.
pub fn load(raw: &str) -> Vec<String> {
    match parse_pgn(raw) {
        Ok(game) => {
            tracing::debug!(plies = game.moves.len(), "Notation parsed strictly");
            game.san_moves()
        }
        Err(e) => {
            let tokens = extract_tokens(raw);
            tracing::debug!(error = %e, tokens = tokens.len(), "Falling back to token extraction");
            tokens
        }
    }
}

/// Strip `{}` comments and `()` variations (nesting allowed), drop move
/// numbers, and split what remains on whitespace.
pub fn extract_tokens(raw: &str) -> Vec<String> {
    let mut stripped = String::with_capacity(raw.len());
    let mut comment_depth = 0usize;
    let mut variation_depth = 0usize;

    for c in raw.chars() {
        match c {
            '{' => comment_depth += 1,
            '}' if comment_depth > 0 => comment_depth -= 1,
            _ if comment_depth > 0 => {}
            '(' => variation_depth += 1,
            ')' if variation_depth > 0 => variation_depth -= 1,
            _ if variation_depth > 0 => {}
            // Separators stand in for removed spans so neighbours don't fuse.
            '}' | ')' => stripped.push(' '),
            c => stripped.push(c),
        }
        if matches!(c, '{' | '(') {
            stripped.push(' ');
        }
    }

    stripped
        .split_whitespace()
        .filter_map(strip_move_number)
        .map(str::to_string)
        .collect()
}

/// `"12."`, `"12..."` vanish; `"12.Nf3"` keeps its move; everything else is
/// returned untouched.
fn strip_move_number(token: &str) -> Option<&str> {
    let digits = token.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return Some(token);
    }
    let rest = &token[digits..];
    if !rest.starts_with('.') {
        return Some(token);
    }
    let rest = rest.trim_start_matches('.');
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}
