use anyhow::Result;
use tracing::{error, info};

use crate::error::EntryError;
use crate::model::draft::EntryDraft;
use crate::model::entry::{ProductionEntry, ProductionType};
use crate::notify::{Notifier, Severity};
use crate::repository::{CollectionPath, EntryStore};

pub const SIGN_IN_TO_SAVE: &str = "Please log in to save production entries.";
pub const SIGN_IN_TO_DELETE: &str = "Please log in to delete production entries.";
pub const SAVED: &str = "Production entry saved successfully!";
pub const UPDATED: &str = "Production entry updated successfully!";
pub const DELETED: &str = "Production entry deleted successfully!";

/// Submits drafts to the store and reports the outcome through a notifier.
///
/// Nothing is retried and nothing is applied locally ahead of the store;
/// a failed save leaves the draft as it was so the caller can resubmit.
pub struct EntryService<S: EntryStore, N: Notifier> {
    store: S,
    notifier: N,
}

impl<S: EntryStore, N: Notifier> EntryService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Creates the draft, or replaces the entry it was opened from.
    /// Returns the entry id.
    pub fn save(&self, owner: Option<&str>, draft: &EntryDraft) -> Result<String> {
        let Some(owner) = owner else {
            self.notifier.show_toast(SIGN_IN_TO_SAVE, Severity::Warning);
            return Err(EntryError::NotSignedIn.into());
        };

        draft.validate()?;

        let path = CollectionPath::production_entries(owner);
        let record = draft.record().clone();
        let result = match draft.editing() {
            Some(id) => self.store.update(&path, id, record).map(|_| id.to_string()),
            None => self.store.create(&path, record),
        };

        match result {
            Ok(id) => {
                let message = if draft.editing().is_some() { UPDATED } else { SAVED };
                info!(collection = %path, %id, entry_type = %draft.kind(), "saved production entry");
                self.notifier.show_toast(message, Severity::Success);
                Ok(id)
            }
            Err(e) => {
                error!(collection = %path, error = %e, "error saving production entry");
                self.notifier
                    .show_toast(&format!("Error saving production entry: {}", e), Severity::Error);
                Err(e)
            }
        }
    }

    pub fn delete(&self, owner: Option<&str>, id: &str) -> Result<()> {
        let Some(owner) = owner else {
            self.notifier.show_toast(SIGN_IN_TO_DELETE, Severity::Warning);
            return Err(EntryError::NotSignedIn.into());
        };

        let path = CollectionPath::production_entries(owner);
        match self.store.delete(&path, id) {
            Ok(()) => {
                info!(collection = %path, %id, "deleted production entry");
                self.notifier.show_toast(DELETED, Severity::Success);
                Ok(())
            }
            Err(e) => {
                error!(collection = %path, error = %e, "error deleting production entry");
                self.notifier
                    .show_toast(&format!("Error deleting production entry: {}", e), Severity::Error);
                Err(e)
            }
        }
    }

    /// Current entries of one type, newest first. Empty when signed out.
    pub fn list(&self, owner: Option<&str>, kind: ProductionType) -> Result<Vec<ProductionEntry>> {
        let Some(owner) = owner else {
            return Ok(Vec::new());
        };
        let entries = self.store.list(&CollectionPath::production_entries(owner))?;
        Ok(entries.into_iter().filter(|e| e.kind() == kind).collect())
    }

    /// Looks an entry up by full id or by a unique id prefix.
    pub fn find(&self, owner: &str, id: &str) -> Result<ProductionEntry> {
        let entries = self.store.list(&CollectionPath::production_entries(owner))?;
        if let Some(entry) = entries.iter().find(|e| e.id == id) {
            return Ok(entry.clone());
        }

        let mut matches: Vec<ProductionEntry> = entries
            .into_iter()
            .filter(|e| !id.is_empty() && e.id.starts_with(id))
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(EntryError::NotFound(id.to_string()).into()),
            count => Err(EntryError::AmbiguousId {
                prefix: id.to_string(),
                count,
            }
            .into()),
        }
    }
}
