use super::{
    builtin_openings, generate_opening_id, ChangeFeed, Opening, OpeningChange, OpeningDraft,
    OpeningStore, StoreError,
};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::{broadcast, RwLock};

/// Volatile store, used by tests and throwaway sessions.
#[derive(Debug)]
pub struct MemoryOpeningStore {
    openings: RwLock<HashMap<String, Opening>>,
    feed: ChangeFeed,
}

impl MemoryOpeningStore {
    pub fn new() -> Self {
        Self::from_openings(Vec::new())
    }

    pub fn with_defaults() -> Self {
        Self::from_openings(builtin_openings())
    }

    pub fn from_openings(openings: impl IntoIterator<Item = Opening>) -> Self {
        Self {
            openings: RwLock::new(openings.into_iter().map(|o| (o.id.clone(), o)).collect()),
            feed: ChangeFeed::new(),
        }
    }

    /// Insert or replace a record verbatim, notifying subscribers.
    pub async fn put(&self, opening: Opening) {
        self.openings
            .write()
            .await
            .insert(opening.id.clone(), opening.clone());
        self.feed.publish(OpeningChange::Upserted(opening));
    }
}

impl Default for MemoryOpeningStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OpeningStore for MemoryOpeningStore {
    fn get(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Opening>, StoreError>> + Send {
        let id = id.to_string();
        async move { Ok(self.openings.read().await.get(&id).cloned()) }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Opening>, StoreError>> + Send {
        async move { Ok(self.openings.read().await.values().cloned().collect()) }
    }

    fn create(
        &self,
        draft: OpeningDraft,
    ) -> impl Future<Output = Result<Opening, StoreError>> + Send {
        async move {
            let opening = draft.validated()?.into_opening(generate_opening_id());
            self.put(opening.clone()).await;
            Ok(opening)
        }
    }

    fn update(
        &self,
        id: &str,
        draft: OpeningDraft,
    ) -> impl Future<Output = Result<Opening, StoreError>> + Send {
        let id = id.to_string();
        async move {
            let draft = draft.validated()?;
            let opening = {
                let mut openings = self.openings.write().await;
                let existing = openings
                    .get(&id)
                    .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                let opening = draft.apply_to(existing);
                openings.insert(id, opening.clone());
                opening
            };
            self.feed.publish(OpeningChange::Upserted(opening.clone()));
            Ok(opening)
        }
    }

    fn delete(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        let id = id.to_string();
        async move {
            if self.openings.write().await.remove(&id).is_none() {
                return Err(StoreError::NotFound(id));
            }
            self.feed.publish(OpeningChange::Deleted(id));
            Ok(())
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<OpeningChange> {
        self.feed.subscribe()
    }
}
