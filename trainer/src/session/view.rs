use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use super::commands::SessionError;
use super::handle::SessionHandle;
use super::spawn_session;
use super::state::SessionOptions;
use crate::config::PracticeConfig;
use crate::openings::OpeningStore;

/// Holds the single active practice session.
///
/// Every `open` or `close` starts a new generation. A load that finishes
/// after its generation has been overtaken is discarded, so a slow store
/// can never resurrect an opening the user already navigated away from.
pub struct PracticeView<S> {
    store: Arc<S>,
    config: PracticeConfig,
    generation: AtomicU64,
    active: Mutex<Option<SessionHandle>>,
}

impl<S: OpeningStore> PracticeView<S> {
    pub fn new(store: Arc<S>, config: PracticeConfig) -> Self {
        Self {
            store,
            config,
            generation: AtomicU64::new(0),
            active: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Switch to `opening_id`. The previous session is shut down right away,
    /// before the new opening has loaded.
    pub async fn open(
        &self,
        opening_id: &str,
        options: SessionOptions,
    ) -> Result<SessionHandle, SessionError> {
        let generation = self.next_generation();
        self.shutdown_active().await;

        // Subscribe before loading so an edit landing in between is not lost.
        let changes = self.store.subscribe();
        let loaded = self.store.get(opening_id).await;

        if !self.is_current(generation) {
            tracing::debug!(opening = opening_id, "Discarding stale opening load");
            return Err(SessionError::Superseded);
        }

        let opening = loaded?.ok_or_else(|| SessionError::OpeningNotFound(opening_id.to_string()))?;
        tracing::info!(opening = %opening.id, name = %opening.name, "Opening loaded");

        let handle = spawn_session(&opening, options, &self.config, Some(changes))?;

        let mut active = self.active.lock().await;
        if !self.is_current(generation) {
            drop(active);
            handle.shutdown().await;
            return Err(SessionError::Superseded);
        }
        *active = Some(handle.clone());
        Ok(handle)
    }

    /// Tear the view down: shut the active session and void pending loads.
    pub async fn close(&self) {
        self.next_generation();
        self.shutdown_active().await;
    }

    pub async fn active(&self) -> Option<SessionHandle> {
        self.active.lock().await.clone()
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn shutdown_active(&self) {
        let previous = self.active.lock().await.take();
        if let Some(handle) = previous {
            tracing::debug!(session = handle.id(), "Closing previous session");
            handle.shutdown().await;
        }
    }
}
