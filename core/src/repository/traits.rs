use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use anyhow::Result;

use crate::model::entry::{EntryRecord, ProductionEntry};

pub const PRODUCTION_ENTRIES: &str = "productionEntries";

/// One owner's collection of documents, `users/{owner}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    pub owner_id: String,
    pub name: String,
}

impl CollectionPath {
    pub fn production_entries(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: PRODUCTION_ENTRIES.to_string(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "users/{}/{}", self.owner_id, self.name)
    }
}

/// Full current contents of a collection, newest first, or the error that
/// prevented reading it.
pub type Snapshot = Result<Vec<ProductionEntry>>;

/// Receiving end of a collection subscription. Dropping it unsubscribes.
pub struct Subscription {
    rx: Receiver<Snapshot>,
}

impl Subscription {
    pub fn channel() -> (Sender<Snapshot>, Subscription) {
        let (tx, rx) = mpsc::channel();
        (tx, Subscription { rx })
    }

    /// Next pending push, if any. Never blocks.
    pub fn try_next(&self) -> Option<Snapshot> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Document-store operations the application relies on.
pub trait EntryStore {
    /// Appends a record; the store assigns id, owner and timestamp.
    fn create(&self, path: &CollectionPath, record: EntryRecord) -> Result<String>;
    /// Replaces every field of an existing record.
    fn update(&self, path: &CollectionPath, id: &str, record: EntryRecord) -> Result<()>;
    fn delete(&self, path: &CollectionPath, id: &str) -> Result<()>;
    /// Current documents, ordered descending by timestamp.
    fn list(&self, path: &CollectionPath) -> Result<Vec<ProductionEntry>>;
    /// Pushes the current snapshot now and again after every change.
    fn subscribe(&self, path: &CollectionPath) -> Result<Subscription>;
}
