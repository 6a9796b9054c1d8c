//! debut: practice chess openings in the terminal.
//!
//! Subcommands browse and edit the opening catalog stored under the data
//! directory (see [`trainer::config`]) and run interactive practice sessions.
//! Logs go to a daily rolling file because stdout is the user interface.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trainer::{
    config, FileOpeningStore, PracticeConfig, PracticeView, SessionError, SessionOptions,
    StoreError,
};

mod openings;
mod practice;
mod render;

#[derive(Parser)]
#[command(name = "debut", about = "Learn chess openings by playing them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List openings, newest first.
    List {
        /// Only show openings whose name contains this text.
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one opening and the line it trains.
    Show { id: String },
    /// Add an opening.
    Add {
        #[arg(long)]
        name: String,
        /// Move text, e.g. "1. e4 e5 2. Nf3 Nc6 3. Bb5".
        #[arg(long)]
        pgn: String,
    },
    /// Change an opening's name and/or move text.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        pgn: Option<String>,
    },
    /// Delete an opening.
    Delete { id: String },
    /// Practice an opening interactively.
    Practice {
        id: String,
        /// The side you play.
        #[arg(long, default_value = "white")]
        side: chess::PlayerSide,
        /// Play both sides yourself instead of having the opponent's moves
        /// played automatically.
        #[arg(long)]
        manual: bool,
    },
}

/// Error type for CLI operations.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidInput(String),
}

fn init_logging() -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = config::get_log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "debut");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    Ok(guard)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let data_dir = config::get_data_dir();
    tracing::debug!(dir = %data_dir.display(), "Opening store");
    let store = Arc::new(FileOpeningStore::open(&data_dir)?);
    let mut out = std::io::stdout();

    match cli.command {
        Commands::List { search } => openings::list(&*store, search.as_deref(), &mut out).await,
        Commands::Show { id } => openings::show(&*store, &id, &mut out).await,
        Commands::Add { name, pgn } => openings::add(&*store, name, pgn, &mut out).await,
        Commands::Edit { id, name, pgn } => {
            openings::edit(&*store, &id, name, pgn, &mut out).await
        }
        Commands::Delete { id } => openings::delete(&*store, &id, &mut out).await,
        Commands::Practice { id, side, manual } => {
            let view = PracticeView::new(store, PracticeConfig::from_env());
            let options = SessionOptions {
                human_side: side,
                auto_play: !manual,
            };
            practice::run(&view, &id, options).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging()?;

    tracing::info!("debut starting");
    let result = run(cli).await;
    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }
    tracing::info!("debut exiting");

    result.map_err(anyhow::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_practice_args() {
        let args = ["debut", "practice", "french", "--side", "black", "--manual"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Practice { id, side, manual } => {
                assert_eq!(id, "french");
                assert_eq!(side, chess::PlayerSide::Black);
                assert!(manual);
            }
            _ => panic!("expected practice"),
        }
    }

    #[test]
    fn test_edit_args() {
        let cli = Cli::try_parse_from(["debut", "edit", "french", "--pgn", "1. e4 e6"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Edit { name: None, pgn: Some(_), .. }
        ));
    }
}
