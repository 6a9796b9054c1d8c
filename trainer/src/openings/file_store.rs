use super::{
    builtin_openings, generate_opening_id, ChangeFeed, JsonStore, Opening, OpeningChange,
    OpeningDraft, OpeningStore, StoreError,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};

/// Openings persisted as JSON files under `<data_dir>/openings`.
///
/// A store whose directory does not exist yet is seeded with the builtin
/// lines. Writes are serialized through a lock so a read-modify-write in
/// `update` cannot interleave with another writer in this process.
#[derive(Debug)]
pub struct FileOpeningStore {
    inner: JsonStore<Opening>,
    write_lock: Mutex<()>,
    feed: ChangeFeed,
}

impl FileOpeningStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let store = Self {
            inner: JsonStore::new(data_dir.join("openings")),
            write_lock: Mutex::new(()),
            feed: ChangeFeed::new(),
        };
        store.seed_defaults()?;
        Ok(store)
    }

    pub fn dir(&self) -> PathBuf {
        self.inner.dir().to_path_buf()
    }

    fn seed_defaults(&self) -> Result<(), StoreError> {
        if self.inner.exists() {
            return Ok(());
        }
        self.inner.ensure_dir()?;
        let defaults = builtin_openings();
        tracing::info!(
            dir = %self.inner.dir().display(),
            count = defaults.len(),
            "Seeding builtin openings"
        );
        for opening in &defaults {
            self.inner.save(opening)?;
        }
        Ok(())
    }
}

impl OpeningStore for FileOpeningStore {
    fn get(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Opening>, StoreError>> + Send {
        let result = self.inner.load(id);
        async move { result }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Opening>, StoreError>> + Send {
        let result = self.inner.load_all();
        async move { result }
    }

    fn create(
        &self,
        draft: OpeningDraft,
    ) -> impl Future<Output = Result<Opening, StoreError>> + Send {
        async move {
            let opening = draft.validated()?.into_opening(generate_opening_id());
            {
                let _guard = self.write_lock.lock().await;
                self.inner.save(&opening)?;
            }
            tracing::info!(id = %opening.id, name = %opening.name, "Opening created");
            self.feed.publish(OpeningChange::Upserted(opening.clone()));
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
                let _guard = self.write_lock.lock().await;
                let existing = self
                    .inner
                    .load(&id)?
                    .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                let opening = draft.apply_to(&existing);
                self.inner.save(&opening)?;
                opening
            };
            tracing::info!(id = %opening.id, name = %opening.name, "Opening updated");
            self.feed.publish(OpeningChange::Upserted(opening.clone()));
            Ok(opening)
        }
    }

    fn delete(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        let id = id.to_string();
        async move {
            let removed = {
                let _guard = self.write_lock.lock().await;
                self.inner.delete(&id)?
            };
            if !removed {
                return Err(StoreError::NotFound(id));
            }
            tracing::info!(id = %id, "Opening deleted");
            self.feed.publish(OpeningChange::Deleted(id));
            Ok(())
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<OpeningChange> {
        self.feed.subscribe()
    }
}
