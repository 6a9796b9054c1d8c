//! Interactive practice loop on stdin/stdout.

use chess::{parse_square, PlayerSide, Square};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use trainer::{
    MoveAttempt, MoveOutcome, OpeningStore, PracticeView, RejectReason, SessionError,
    SessionEvent, SessionHandle, SessionOptions,
};

use crate::render;
use crate::CliError;

const HELP: &str = "\
Commands:
  e2e4          play a move (append q/r/b/n to choose a promotion)
  moves <sq>    show where the piece on <sq> can go
  auto on|off   let the opponent's moves play themselves
  side white|black
                switch sides (restarts the line)
  restart       start the line over
  board         show the board again
  help          this text
  quit          leave";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Move(MoveAttempt),
    Moves(Square),
    Auto(bool),
    Side(PlayerSide),
    Restart,
    Board,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or("").to_ascii_lowercase();
    let arg = words.next();

    match (head.as_str(), arg) {
        ("quit" | "exit" | "q", None) => Ok(ReplCommand::Quit),
        ("help" | "?", None) => Ok(ReplCommand::Help),
        ("board", None) => Ok(ReplCommand::Board),
        ("restart" | "reset", None) => Ok(ReplCommand::Restart),
        ("moves", Some(sq)) => parse_square(&sq.to_ascii_lowercase())
            .map(ReplCommand::Moves)
            .ok_or_else(|| format!("Not a square: {}", sq)),
        ("auto", Some("on")) => Ok(ReplCommand::Auto(true)),
        ("auto", Some("off")) => Ok(ReplCommand::Auto(false)),
        ("side", Some(side)) => side.parse().map(ReplCommand::Side),
        ("", None) => Err("Type a move like e2e4, or `help`.".to_string()),
        _ => line
            .trim()
            .to_ascii_lowercase()
            .parse::<MoveAttempt>()
            .map(ReplCommand::Move)
            .map_err(|_| format!("Unknown command: {}. Type `help`.", line.trim())),
    }
}

/// Open `opening_id` in `view` and practice until the user quits, stdin
/// closes, or the opening is deleted.
pub async fn run<S: OpeningStore>(
    view: &PracticeView<S>,
    opening_id: &str,
    options: SessionOptions,
) -> Result<(), CliError> {
    let handle = view.open(opening_id, options).await?;
    let (snapshot, mut events) = handle.subscribe().await?;
    println!("{}", render::snapshot(&snapshot, &[]));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(ReplCommand::Quit) => break,
                    Ok(cmd) => {
                        if let Err(e) = execute(&handle, cmd).await {
                            println!("{}", e);
                            if matches!(e, SessionError::Closed) {
                                break;
                            }
                        }
                    }
                    Err(msg) => println!("{}", msg),
                }
            }

            event = events.recv() => {
                match event {
                    Ok(SessionEvent::StateChanged(snapshot)) => {
                        println!("{}", render::snapshot(&snapshot, &[]));
                    }
                    Ok(SessionEvent::Feedback(feedback)) => {
                        if let Some(cue) = render::feedback(feedback) {
                            println!("{}", cue);
                        }
                    }
                    Ok(SessionEvent::Warning(text)) => println!("warning: {}", text),
                    Ok(SessionEvent::OpeningRemoved(_)) => {
                        println!("This opening was deleted.");
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Practice display lagged");
                        let snapshot = handle.snapshot().await?;
                        println!("{}", render::snapshot(&snapshot, &[]));
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    view.close().await;
    Ok(())
}

/// Run one command against the session. State changes are printed when
/// their events arrive, so only replies without an event are printed here.
async fn execute(handle: &SessionHandle, cmd: ReplCommand) -> Result<(), SessionError> {
    match cmd {
        ReplCommand::Move(attempt) => {
            if let MoveOutcome::Rejected(RejectReason::SessionComplete) =
                handle.attempt_move(attempt).await?
            {
                println!("The line is complete. Type `restart` to practice it again.");
            }
        }
        ReplCommand::Moves(square) => {
            let targets = handle.legal_destinations(square).await?;
            let snapshot = handle.snapshot().await?;
            println!("{}", render::snapshot(&snapshot, &targets));
            println!("{}", render::destinations(square, &targets));
        }
        ReplCommand::Auto(enabled) => {
            handle.set_auto_play(enabled).await?;
        }
        ReplCommand::Side(side) => {
            handle.set_side(side).await?;
        }
        ReplCommand::Restart => {
            handle.reset().await?;
        }
        ReplCommand::Board => {
            let snapshot = handle.snapshot().await?;
            println!("{}", render::snapshot(&snapshot, &[]));
        }
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::PieceKind;

    #[test]
    fn test_parse_moves() {
        assert_eq!(
            parse_command("e2e4"),
            Ok(ReplCommand::Move(MoveAttempt::new(Square::E2, Square::E4)))
        );
        assert_eq!(
            parse_command("  E7E8N "),
            Ok(ReplCommand::Move(
                MoveAttempt::new(Square::E7, Square::E8).with_promotion(PieceKind::Knight)
            ))
        );
        assert!(parse_command("Nf3").is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("moves g1"), Ok(ReplCommand::Moves(Square::G1)));
        assert_eq!(parse_command("auto off"), Ok(ReplCommand::Auto(false)));
        assert_eq!(parse_command("side black"), Ok(ReplCommand::Side(PlayerSide::Black)));
        assert_eq!(parse_command("restart"), Ok(ReplCommand::Restart));
        assert_eq!(parse_command("board"), Ok(ReplCommand::Board));
        assert_eq!(parse_command("quit"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("moves z9").is_err());
        assert!(parse_command("auto maybe").is_err());
        assert!(parse_command("side green").is_err());
    }
}
