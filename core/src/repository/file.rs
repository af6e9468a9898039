use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::entry::{EntryRecord, ProductionEntry};
use crate::repository::traits::{CollectionPath, EntryStore, Snapshot, Subscription};

const DEFAULT_DIR_NAME: &str = ".millrun";

/// Keeps each collection as one pretty-printed JSON array under
/// `<base>/users/<owner>/<collection>.json`.
#[derive(Clone)]
pub struct FileEntryStore {
    base_dir: PathBuf,
    subscribers: Rc<RefCell<Vec<(CollectionPath, Sender<Snapshot>)>>>,
}

impl FileEntryStore {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let path = match base_dir {
            Some(dir) => dir,
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(DEFAULT_DIR_NAME)
            }
        };
        fs::create_dir_all(&path)?;

        Ok(FileEntryStore {
            base_dir: path,
            subscribers: Rc::new(RefCell::new(Vec::new())),
        })
    }

    fn document_path(&self, path: &CollectionPath) -> Result<PathBuf> {
        for segment in [path.owner_id.as_str(), path.name.as_str()] {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains(|c: char| c == '/' || c == '\\')
            {
                return Err(anyhow!("Invalid collection path: {}", path));
            }
        }
        Ok(self
            .base_dir
            .join("users")
            .join(&path.owner_id)
            .join(format!("{}.json", path.name)))
    }

    fn read_entries(&self, path: &CollectionPath) -> Result<Vec<ProductionEntry>> {
        let file_path = self.document_path(path)?;
        if !file_path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let entries = serde_json::from_reader(reader)?;
        Ok(entries)
    }

    fn write_entries(&self, path: &CollectionPath, entries: &[ProductionEntry]) -> Result<()> {
        let file_path = self.document_path(path)?;
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&file_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, entries)?;
        writer.flush()?;
        Ok(())
    }

    fn snapshot(&self, path: &CollectionPath) -> Snapshot {
        let mut entries = self.read_entries(path)?;
        // Stable, so documents sharing a timestamp keep insertion order.
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    fn publish(&self, path: &CollectionPath) {
        let mut subscribers = self.subscribers.borrow_mut();
        if !subscribers.iter().any(|(p, _)| p == path) {
            return;
        }

        let snapshot = self.snapshot(path);
        if let Err(e) = &snapshot {
            warn!(collection = %path, error = %e, "failed to read collection for subscribers");
        }

        subscribers.retain(|(p, tx)| {
            if p != path {
                return true;
            }
            let push = match &snapshot {
                Ok(entries) => Ok(entries.clone()),
                Err(e) => Err(anyhow!("{:#}", e)),
            };
            tx.send(push).is_ok()
        });
    }
}

impl EntryStore for FileEntryStore {
    fn create(&self, path: &CollectionPath, record: EntryRecord) -> Result<String> {
        let mut entries = self.read_entries(path)?;
        let entry = ProductionEntry {
            id: Uuid::new_v4().to_string(),
            user_id: path.owner_id.clone(),
            timestamp: Utc::now(),
            record,
        };
        let id = entry.id.clone();
        entries.push(entry);
        self.write_entries(path, &entries)?;
        debug!(collection = %path, %id, "created entry");

        self.publish(path);
        Ok(id)
    }

    fn update(&self, path: &CollectionPath, id: &str, record: EntryRecord) -> Result<()> {
        let mut entries = self.read_entries(path)?;
        let existing = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if existing.kind() != record.kind() {
            return Err(StoreError::TypeChanged {
                id: id.to_string(),
                existing: existing.kind(),
                requested: record.kind(),
            }
            .into());
        }

        existing.record = record;
        existing.timestamp = Utc::now();
        self.write_entries(path, &entries)?;
        debug!(collection = %path, %id, "replaced entry");

        self.publish(path);
        Ok(())
    }

    fn delete(&self, path: &CollectionPath, id: &str) -> Result<()> {
        let mut entries = self.read_entries(path)?;
        let initial_len = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() == initial_len {
            return Err(StoreError::NotFound(id.to_string()).into());
        }

        self.write_entries(path, &entries)?;
        debug!(collection = %path, %id, "deleted entry");

        self.publish(path);
        Ok(())
    }

    fn list(&self, path: &CollectionPath) -> Result<Vec<ProductionEntry>> {
        self.snapshot(path)
    }

    fn subscribe(&self, path: &CollectionPath) -> Result<Subscription> {
        // Reject bad paths up front rather than as a first pushed error.
        self.document_path(path)?;

        let (tx, subscription) = Subscription::channel();
        // The receiver is alive, so this send cannot fail.
        let _ = tx.send(self.snapshot(path));
        self.subscribers.borrow_mut().push((path.clone(), tx));
        debug!(collection = %path, "subscribed");
        Ok(subscription)
    }
}
