//! Opening records, their authoring rules and the stores that hold them.

pub mod catalog;
mod file_store;
mod json_store;
mod memory;

pub(crate) use json_store::{JsonStore, Storable};

pub use catalog::OpeningSummary;
pub use file_store::FileOpeningStore;
pub use memory::MemoryOpeningStore;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;

use crate::notation;

/// Capacity of a store's change feed before slow subscribers start lagging.
const CHANGE_FEED_CAPACITY: usize = 64;

/// A named training line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Opening {
    pub id: String,
    pub name: String,
    /// Free-form move text as entered by an author.
    #[serde(rename = "pgn", default)]
    pub notation: String,
    /// Structured SAN list; takes precedence over `notation` when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moves: Vec<String>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

impl Opening {
    /// The ordered SAN moves a session has to reproduce.
    pub fn target_sequence(&self) -> Vec<String> {
        if self.moves.is_empty() {
            notation::load(&self.notation)
        } else {
            self.moves.clone()
        }
    }

    pub fn summary(&self) -> OpeningSummary {
        OpeningSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

impl Storable for Opening {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Author input for creating or editing an opening.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpeningDraft {
    pub name: String,
    pub notation: String,
}

impl OpeningDraft {
    pub fn new(name: impl Into<String>, notation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notation: notation.into(),
        }
    }

    /// Trim both fields; both must be non-empty afterwards.
    pub fn validated(self) -> Result<Self, StoreError> {
        let name = self.name.trim().to_string();
        let notation = self.notation.trim().to_string();
        if name.is_empty() || notation.is_empty() {
            return Err(StoreError::Validation(
                "name and notation are both required".to_string(),
            ));
        }
        Ok(Self { name, notation })
    }

    /// Build a fresh record from a validated draft.
    fn into_opening(self, id: String) -> Opening {
        let now = now_millis();
        Opening {
            id,
            name: self.name,
            notation: self.notation,
            moves: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated draft to an existing record. The structured move
    /// list is dropped so the new notation is authoritative.
    fn apply_to(self, existing: &Opening) -> Opening {
        Opening {
            id: existing.id.clone(),
            name: self.name,
            notation: self.notation,
            moves: Vec::new(),
            created_at: existing.created_at,
            updated_at: now_millis(),
        }
    }
}

/// A live change to a store's contents.
#[derive(Debug, Clone, PartialEq)]
pub enum OpeningChange {
    Upserted(Opening),
    Deleted(String),
}

impl OpeningChange {
    pub fn opening_id(&self) -> &str {
        match self {
            Self::Upserted(opening) => &opening.id,
            Self::Deleted(id) => id,
        }
    }
}

/// Errors from the opening stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid opening: {0}")]
    Validation(String),
    #[error("Opening not found: {0}")]
    NotFound(String),
}

/// Document store for openings.
///
/// Methods return `impl Future + Send` rather than using `async fn` so the
/// futures can be driven from spawned tasks.
pub trait OpeningStore: Send + Sync {
    fn get(&self, id: &str)
        -> impl Future<Output = Result<Option<Opening>, StoreError>> + Send;
    fn list(&self) -> impl Future<Output = Result<Vec<Opening>, StoreError>> + Send;
    fn create(
        &self,
        draft: OpeningDraft,
    ) -> impl Future<Output = Result<Opening, StoreError>> + Send;
    fn update(
        &self,
        id: &str,
        draft: OpeningDraft,
    ) -> impl Future<Output = Result<Opening, StoreError>> + Send;
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Live changes from now on. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<OpeningChange>;
}

/// Broadcast side of a store's change notifications.
#[derive(Debug, Clone)]
pub(crate) struct ChangeFeed {
    tx: broadcast::Sender<OpeningChange>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, change: OpeningChange) {
        tracing::debug!(id = change.opening_id(), "Opening changed");
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OpeningChange> {
        self.tx.subscribe()
    }
}

/// The lines every fresh store starts with.
pub fn builtin_openings() -> Vec<Opening> {
    [
        (
            "ruy-lopez",
            "Ruy Lopez",
            "1. e4 e5 2. Nf3 Nc6 3. Bb5",
            &["e4", "e5", "Nf3", "Nc6", "Bb5"][..],
        ),
        (
            "sicilian",
            "Sicilian Defense",
            "1. e4 c5 2. Nf3 d6 3. d4 cxd4",
            &["e4", "c5", "Nf3", "d6", "d4", "cxd4"][..],
        ),
        (
            "french",
            "French Defense",
            "1. e4 e6 2. d4 d5",
            &["e4", "e6", "d4", "d5"][..],
        ),
    ]
    .into_iter()
    .map(|(id, name, notation, moves)| Opening {
        id: id.to_string(),
        name: name.to_string(),
        notation: notation.to_string(),
        moves: moves.iter().map(|m| m.to_string()).collect(),
        created_at: 0,
        updated_at: 0,
    })
    .collect()
}

/// Generate a new opening id.
pub fn generate_opening_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Ids double as file names, so only a conservative alphabet is accepted.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Current unix time in milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
