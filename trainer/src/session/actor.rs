use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::time;
use tracing::Instrument;

use super::commands::SessionCommand;
use super::events::SessionEvent;
use super::state::{AutoAdvance, LineChange, MoveOutcome, PracticeState, RejectReason};
use crate::openings::OpeningChange;

/// The session actor loop.
/// Owns the practice state. Commands, store changes and auto-play ticks are
/// processed one at a time.
pub(crate) async fn run_session_actor(
    state: PracticeState,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
    changes: Option<broadcast::Receiver<OpeningChange>>,
    auto_play_delay: Duration,
) {
    let session_id = state.session_id().to_string();
    run_session_actor_inner(state, cmd_rx, event_tx, changes, auto_play_delay)
        .instrument(tracing::info_span!("session", id = %session_id))
        .await;
}

async fn run_session_actor_inner(
    mut state: PracticeState,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
    mut changes: Option<broadcast::Receiver<OpeningChange>>,
    auto_play_delay: Duration,
) {
    tracing::info!(opening = %state.opening_id(), "Session actor started");

    let mut auto_play = time::interval(auto_play_delay);
    auto_play.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    // The first tick of a fresh interval is immediate; the opponent's first
    // reply should still wait one delay.
    auto_play.reset();

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Session actor shutting down");
                        break;
                    }
                    Some(cmd) => {
                        let could_advance = state.should_auto_advance();
                        handle_command(&mut state, cmd, &event_tx);
                        if state.should_auto_advance() && !could_advance {
                            auto_play.reset();
                        }
                    }
                }
            }

            change = next_change(&mut changes) => {
                match change {
                    Ok(change) => {
                        if !handle_change(&mut state, change, &event_tx) {
                            break;
                        }
                        if state.should_auto_advance() {
                            auto_play.reset();
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Opening change feed lagged");
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Opening change feed closed");
                        changes = None;
                    }
                }
            }

            _ = auto_play.tick(), if state.should_auto_advance() => {
                handle_auto_advance(&mut state, &event_tx);
            }
        }
    }

    tracing::info!("Session actor exited");
}

fn handle_command(
    state: &mut PracticeState,
    cmd: SessionCommand,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    match cmd {
        SessionCommand::AttemptMove { attempt, reply } => {
            let outcome = state.attempt_move(attempt);
            if outcome != MoveOutcome::Rejected(RejectReason::SessionComplete) {
                let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
            }
            let _ = reply.send(outcome);
        }
        SessionCommand::SetAutoPlay { enabled, reply } => {
            state.set_auto_play(enabled);
            tracing::debug!(enabled, "Auto-play toggled");
            let snapshot = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            let _ = reply.send(snapshot);
        }
        SessionCommand::SetSide { side, reply } => {
            state.set_side(side);
            tracing::debug!(side = side.as_str(), "Side changed");
            let snapshot = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            let _ = reply.send(snapshot);
        }
        SessionCommand::Reset { reply } => {
            state.reset();
            let snapshot = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            let _ = reply.send(snapshot);
        }
        SessionCommand::LegalDestinations { square, reply } => {
            let _ = reply.send(state.legal_destinations(square));
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = state.snapshot();
            let rx = event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
        }
        SessionCommand::Shutdown => unreachable!(),
    }
}

/// Apply a store change. Returns false when the session must stop.
fn handle_change(
    state: &mut PracticeState,
    change: OpeningChange,
    event_tx: &broadcast::Sender<SessionEvent>,
) -> bool {
    if change.opening_id() != state.opening_id() {
        return true;
    }

    match change {
        OpeningChange::Upserted(opening) => {
            match state.replace_line(&opening.name, opening.target_sequence()) {
                Ok(LineChange::Kept) => {
                    tracing::info!("Opening edited; progress kept");
                }
                Ok(LineChange::Reset) => {
                    tracing::info!("Opening edited; line restarted");
                    let _ = event_tx.send(SessionEvent::Warning(
                        "The opening was edited and the line restarted.".to_string(),
                    ));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring edited opening");
                    let _ = event_tx.send(SessionEvent::Warning(format!(
                        "{}; keeping the previous line.",
                        e
                    )));
                    return true;
                }
            }
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
            true
        }
        OpeningChange::Deleted(id) => {
            tracing::info!("Opening deleted; stopping session");
            let _ = event_tx.send(SessionEvent::OpeningRemoved(id));
            false
        }
    }
}

fn handle_auto_advance(state: &mut PracticeState, event_tx: &broadcast::Sender<SessionEvent>) {
    match state.auto_advance() {
        AutoAdvance::Played { .. } => {
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
        AutoAdvance::Stalled { expected } => {
            let _ = event_tx.send(SessionEvent::Warning(format!(
                "{} ({} cannot be played)",
                state.message(),
                expected
            )));
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
        AutoAdvance::NotApplicable => {}
    }
}

/// Next store change, or never when the session does not follow a store.
async fn next_change(
    changes: &mut Option<broadcast::Receiver<OpeningChange>>,
) -> Result<OpeningChange, RecvError> {
    match changes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
