use super::{is_valid_id, StoreError};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Records that can live in a [`JsonStore`].
pub trait Storable: Serialize + DeserializeOwned {
    fn id(&self) -> &str;
}

/// One pretty-printed JSON document per record, named `<id>.json`.
#[derive(Debug)]
pub struct JsonStore<T> {
    dir: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T: Storable> JsonStore<T> {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            _phantom: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn file_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Write a record, replacing any previous version.
    ///
    /// The document goes to a sibling temp file first and is renamed into
    /// place so readers never observe a half-written record.
    pub fn save(&self, record: &T) -> Result<(), StoreError> {
        let id = record.id();
        if !is_valid_id(id) {
            return Err(StoreError::Validation(format!("invalid id {:?}", id)));
        }
        self.ensure_dir()?;
        let path = self.file_path(id);
        let tmp = self.dir.join(format!(".{}.json.tmp", id));
        std::fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Load a record by id. `None` if absent or the id is not storable.
    pub fn load(&self, id: &str) -> Result<Option<T>, StoreError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        let path = self.file_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Load every record, skipping documents that fail to read or parse.
    pub fn load_all(&self) -> Result<Vec<T>, StoreError> {
        if !self.exists() {
            return Ok(vec![]);
        }
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|contents| {
                    serde_json::from_str::<T>(&contents).map_err(StoreError::from)
                });
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable record: {}", e)
                }
            }
        }
        Ok(records)
    }

    /// Remove a record. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        if !is_valid_id(id) {
            return Ok(false);
        }
        let path = self.file_path(id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Storable for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_save_load_delete() {
        let tmp = TempDir::new().unwrap();
        let store: JsonStore<Note> = JsonStore::new(tmp.path().join("notes"));
        assert!(!store.exists());

        store.save(&note("a", "first")).unwrap();
        store.save(&note("a", "second")).unwrap();
        assert_eq!(store.load("a").unwrap(), Some(note("a", "second")));
        assert_eq!(store.load_all().unwrap().len(), 1);

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.load("a").unwrap(), None);
    }

    #[test]
    fn test_load_all_skips_garbage() {
        let tmp = TempDir::new().unwrap();
        let store: JsonStore<Note> = JsonStore::new(tmp.path().to_path_buf());
        store.save(&note("good", "ok")).unwrap();
        std::fs::write(tmp.path().join("bad.json"), "{ not json").unwrap();
        std::fs::write(tmp.path().join("readme.txt"), "ignored").unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all, vec![note("good", "ok")]);
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let tmp = TempDir::new().unwrap();
        let store: JsonStore<Note> = JsonStore::new(tmp.path().to_path_buf());
        assert!(matches!(
            store.save(&note("../escape", "x")),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.load("../escape").unwrap(), None);
    }
}
