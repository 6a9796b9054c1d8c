//! Practice sessions: the synchronous state machine, the actor hosting it
//! and the view that keeps a single session active.

mod actor;
mod commands;
mod events;
mod handle;
mod snapshot;
mod state;
mod view;

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::config::{PracticeConfig, MIN_AUTO_PLAY_DELAY};
use crate::feedback::ChannelFeedback;
use crate::openings::{Opening, OpeningChange};
use actor::run_session_actor;

pub use commands::SessionError;
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use snapshot::SessionSnapshot;
pub use state::{
    AutoAdvance, LineChange, MoveAttempt, MoveOutcome, PracticeState, PracticeStatus,
    RejectReason, SessionOptions,
};
pub use view::PracticeView;

/// Spawn an actor practicing `opening`.
///
/// With `changes`, the session follows edits and deletion of its opening.
/// Feedback is published on the session's event channel. Zero capacities or
/// a zero delay in `config` are raised to the smallest usable value.
pub fn spawn_session(
    opening: &Opening,
    options: SessionOptions,
    config: &PracticeConfig,
    changes: Option<broadcast::Receiver<OpeningChange>>,
) -> Result<SessionHandle, SessionError> {
    let session_id = Uuid::new_v4().to_string();

    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_capacity.max(1));
    let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

    let feedback = Arc::new(ChannelFeedback::new(event_tx.clone()));
    let state = PracticeState::from_opening(session_id.clone(), opening, options, feedback)?;

    tokio::spawn(run_session_actor(
        state,
        cmd_rx,
        event_tx,
        changes,
        config.auto_play_delay.max(MIN_AUTO_PLAY_DELAY),
    ));

    Ok(SessionHandle::new(session_id, cmd_tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Feedback;
    use crate::openings::{builtin_openings, MemoryOpeningStore, OpeningDraft, OpeningStore};
    use chess::{PlayerSide, Square};
    use std::time::Duration;
    use tokio::time::timeout;

    fn fast_config() -> PracticeConfig {
        PracticeConfig::default().with_auto_play_delay(Duration::from_millis(5))
    }

    fn ruy_lopez() -> Opening {
        builtin_openings()
            .into_iter()
            .find(|o| o.id == "ruy-lopez")
            .unwrap()
    }

    fn manual() -> SessionOptions {
        SessionOptions {
            human_side: PlayerSide::White,
            auto_play: false,
        }
    }

    /// Receive events until one matches, failing after a second.
    async fn wait_for(
        rx: &mut broadcast::Receiver<SessionEvent>,
        mut pred: impl FnMut(&SessionEvent) -> bool,
    ) -> SessionEvent {
        timeout(Duration::from_secs(1), async {
            loop {
                let event = rx.recv().await.unwrap();
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_zeroed_config_still_runs() {
        let config = PracticeConfig {
            auto_play_delay: Duration::ZERO,
            command_capacity: 0,
            event_capacity: 0,
        };
        let options = SessionOptions {
            human_side: PlayerSide::Black,
            auto_play: true,
        };
        let handle = spawn_session(&ruy_lopez(), options, &config, None).unwrap();

        // A one-slot event channel lags readers, so poll the snapshot instead.
        let snapshot = timeout(Duration::from_secs(1), async {
            loop {
                let snapshot = handle.snapshot().await.unwrap();
                if snapshot.move_index == 1 {
                    return snapshot;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(snapshot.played, vec!["e4"]);
        assert!(!handle.is_closed());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_moves_through_the_actor() {
        let handle = spawn_session(&ruy_lopez(), manual(), &fast_config(), None).unwrap();
        let (snapshot, mut rx) = handle.subscribe().await.unwrap();
        assert_eq!(snapshot.move_index, 0);
        assert_eq!(snapshot.total_moves, 5);

        let outcome = handle.attempt_move("e2e4".parse().unwrap()).await.unwrap();
        assert!(outcome.is_accepted());

        wait_for(&mut rx, |e| matches!(e, SessionEvent::Feedback(Feedback::Move))).await;
        let changed = wait_for(&mut rx, |e| matches!(e, SessionEvent::StateChanged(_))).await;
        match changed {
            SessionEvent::StateChanged(s) => assert_eq!(s.played, vec!["e4"]),
            other => panic!("unexpected {:?}", other),
        }

        let outcome = handle.attempt_move("d7d5".parse().unwrap()).await.unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Rejected(RejectReason::SequenceMismatch {
                expected: "e5".to_string(),
                played: "d5".to_string()
            })
        );
        wait_for(&mut rx, |e| matches!(e, SessionEvent::Feedback(Feedback::WrongMove))).await;

        assert_eq!(
            handle.legal_destinations(Square::E7).await.unwrap(),
            vec![Square::E5, Square::E6]
        );

        handle.shutdown().await;
        handle.closed().await;
        assert!(handle.is_closed());
        assert!(matches!(handle.snapshot().await, Err(SessionError::Closed)));
    }

    #[tokio::test]
    async fn test_auto_play_answers_the_human() {
        let handle =
            spawn_session(&ruy_lopez(), SessionOptions::default(), &fast_config(), None).unwrap();
        let (_, mut rx) = handle.subscribe().await.unwrap();

        handle.attempt_move("e2e4".parse().unwrap()).await.unwrap();
        wait_for(&mut rx, |e| {
            matches!(e, SessionEvent::StateChanged(s) if s.move_index == 2)
        })
        .await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.played, vec!["e4", "e5"]);
        assert_eq!(snapshot.message, "Auto played. Your move!");
        assert!(snapshot.is_human_turn());
    }

    #[tokio::test]
    async fn test_auto_play_opens_for_a_black_human() {
        let options = SessionOptions {
            human_side: PlayerSide::Black,
            auto_play: true,
        };
        let handle = spawn_session(&ruy_lopez(), options, &fast_config(), None).unwrap();
        let (_, mut rx) = handle.subscribe().await.unwrap();

        wait_for(&mut rx, |e| {
            matches!(e, SessionEvent::StateChanged(s) if s.played == vec!["e4".to_string()])
        })
        .await;

        // Switching sides restarts; white plays by hand from here on.
        let snapshot = handle.set_side(PlayerSide::White).await.unwrap();
        assert_eq!(snapshot.move_index, 0);
        assert_eq!(snapshot.human_side, PlayerSide::White);
    }

    #[tokio::test]
    async fn test_stalled_line_warns_once() {
        let opening = Opening {
            moves: vec!["e4".to_string(), "Ke7?!x".to_string()],
            ..ruy_lopez()
        };
        let handle =
            spawn_session(&opening, SessionOptions::default(), &fast_config(), None).unwrap();
        let (_, mut rx) = handle.subscribe().await.unwrap();

        handle.attempt_move("e2e4".parse().unwrap()).await.unwrap();
        wait_for(&mut rx, |e| matches!(e, SessionEvent::Warning(_))).await;

        // Give the ticker room to misbehave, then make sure nothing else came.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.stalled);
        assert_eq!(snapshot.move_index, 1);
        let mut warnings = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, SessionEvent::Warning(_)) {
                warnings += 1;
            }
        }
        assert_eq!(warnings, 0);

        let snapshot = handle.reset().await.unwrap();
        assert!(!snapshot.stalled);
    }

    #[tokio::test]
    async fn test_session_follows_store_edits() {
        let store = MemoryOpeningStore::with_defaults();
        let opening = store.get("ruy-lopez").await.unwrap().unwrap();
        let handle =
            spawn_session(&opening, manual(), &fast_config(), Some(store.subscribe())).unwrap();
        let (_, mut rx) = handle.subscribe().await.unwrap();

        handle.attempt_move("e2e4".parse().unwrap()).await.unwrap();

        store
            .update(
                "ruy-lopez",
                OpeningDraft::new("Ruy Lopez", "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"),
            )
            .await
            .unwrap();
        let event = wait_for(&mut rx, |e| {
            matches!(e, SessionEvent::StateChanged(s) if s.total_moves == 6)
        })
        .await;
        match event {
            SessionEvent::StateChanged(s) => assert_eq!(s.move_index, 1),
            other => panic!("unexpected {:?}", other),
        }

        // Edits to other openings are ignored.
        store
            .update("french", OpeningDraft::new("French", "1. e4 e6"))
            .await
            .unwrap();
        assert_eq!(handle.snapshot().await.unwrap().total_moves, 6);

        store.delete("ruy-lopez").await.unwrap();
        wait_for(&mut rx, |e| {
            matches!(e, SessionEvent::OpeningRemoved(id) if id == "ruy-lopez")
        })
        .await;
        handle.closed().await;
        assert!(matches!(
            handle.attempt_move("e7e5".parse().unwrap()).await,
            Err(SessionError::Closed)
        ));
    }

    #[test]
    fn test_empty_opening_is_refused() {
        let opening = Opening {
            notation: "{ nothing but a comment }".to_string(),
            moves: Vec::new(),
            ..ruy_lopez()
        };
        assert!(matches!(
            spawn_session(&opening, manual(), &fast_config(), None),
            Err(SessionError::MalformedOpeningData(_))
        ));
    }
}
