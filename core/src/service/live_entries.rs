use anyhow::Result;
use tracing::{debug, warn};

use crate::model::entry::{ProductionEntry, ProductionType};
use crate::notify::{Notifier, Severity};
use crate::repository::{CollectionPath, EntryStore, Subscription};

pub const FETCH_FAILED: &str = "Error fetching production entries.";

/// Process-local copy of the signed-in owner's entries of one type.
///
/// The list only changes in [`LiveEntries::pump`], which replaces it with
/// the latest snapshot pushed by the store.
pub struct LiveEntries {
    owner: Option<String>,
    kind: ProductionType,
    subscription: Option<Subscription>,
    entries: Vec<ProductionEntry>,
    loading: bool,
}

impl LiveEntries {
    pub fn new(kind: ProductionType) -> Self {
        Self {
            owner: None,
            kind,
            subscription: None,
            entries: Vec::new(),
            loading: false,
        }
    }

    /// Drops any previous subscription and subscribes for `owner`.
    pub fn start<S: EntryStore>(&mut self, store: &S, owner: &str, kind: ProductionType) -> Result<()> {
        if self.owner.as_deref() != Some(owner) {
            self.entries.clear();
        }
        self.subscription = None;
        self.owner = Some(owner.to_string());
        self.kind = kind;
        self.loading = true;

        match store.subscribe(&CollectionPath::production_entries(owner)) {
            Ok(subscription) => {
                debug!(%owner, entry_type = %kind, "live entries subscribed");
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(e) => {
                self.loading = false;
                Err(e)
            }
        }
    }

    /// Resubscribes for the current owner. Signed out, only the type changes.
    pub fn switch_type<S: EntryStore>(&mut self, store: &S, kind: ProductionType) -> Result<()> {
        match self.owner.clone() {
            Some(owner) => self.start(store, &owner, kind),
            None => {
                self.kind = kind;
                Ok(())
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.subscription = None;
        self.owner = None;
        self.entries.clear();
        self.loading = false;
    }

    /// Applies every pending push. Returns true when the list was replaced.
    pub fn pump<N: Notifier>(&mut self, notifier: &N) -> bool {
        let Some(subscription) = &self.subscription else {
            return false;
        };

        let mut replaced = false;
        while let Some(push) = subscription.try_next() {
            self.loading = false;
            match push {
                Ok(entries) => {
                    let kind = self.kind;
                    self.entries = entries.into_iter().filter(|e| e.kind() == kind).collect();
                    replaced = true;
                }
                Err(e) => {
                    warn!(error = %e, "error fetching production entries");
                    notifier.show_toast(FETCH_FAILED, Severity::Error);
                }
            }
        }
        replaced
    }

    pub fn entries(&self) -> &[ProductionEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn production_type(&self) -> ProductionType {
        self.kind
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::EntryRecord;
    use crate::repository::{FileEntryStore, Snapshot};
    use anyhow::anyhow;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::cell::RefCell;
    use std::sync::mpsc::Sender;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingNotifier {
        toasts: RefCell<Vec<(String, Severity)>>,
    }

    impl Notifier for RecordingNotifier {
        fn show_toast(&self, message: &str, severity: Severity) {
            self.toasts.borrow_mut().push((message.to_string(), severity));
        }
    }

    /// Store whose pushes are driven by the test.
    #[derive(Default)]
    struct ScriptedStore {
        senders: RefCell<Vec<Sender<Snapshot>>>,
    }

    impl ScriptedStore {
        fn push(&self, snapshot: Snapshot) {
            let senders = self.senders.borrow();
            let tx = senders.last().unwrap();
            tx.send(snapshot).unwrap();
        }
    }

    impl EntryStore for ScriptedStore {
        fn create(&self, _path: &CollectionPath, _record: EntryRecord) -> Result<String> {
            unimplemented!()
        }
        fn update(&self, _path: &CollectionPath, _id: &str, _record: EntryRecord) -> Result<()> {
            unimplemented!()
        }
        fn delete(&self, _path: &CollectionPath, _id: &str) -> Result<()> {
            unimplemented!()
        }
        fn list(&self, _path: &CollectionPath) -> Result<Vec<ProductionEntry>> {
            unimplemented!()
        }
        fn subscribe(&self, _path: &CollectionPath) -> Result<Subscription> {
            let (tx, subscription) = Subscription::channel();
            self.senders.borrow_mut().push(tx);
            Ok(subscription)
        }
    }

    fn entry(id: &str, kind: ProductionType) -> ProductionEntry {
        ProductionEntry {
            id: id.to_string(),
            user_id: "u".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            record: EntryRecord::new(kind, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
        }
    }

    #[test]
    fn test_snapshot_replaces_list_filtered_by_type() {
        let store = ScriptedStore::default();
        let notifier = RecordingNotifier::default();
        let mut live = LiveEntries::new(ProductionType::Knitting);

        live.start(&store, "u", ProductionType::Knitting).unwrap();
        assert!(live.is_loading());
        assert!(!live.pump(&notifier));

        store.push(Ok(vec![
            entry("k1", ProductionType::Knitting),
            entry("d1", ProductionType::Dyeing),
            entry("k2", ProductionType::Knitting),
        ]));
        assert!(live.pump(&notifier));
        assert!(!live.is_loading());
        let ids: Vec<_> = live.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["k1", "k2"]);

        store.push(Ok(vec![entry("k3", ProductionType::Knitting)]));
        live.pump(&notifier);
        assert_eq!(live.entries().len(), 1);
        assert_eq!(live.entries()[0].id, "k3");
    }

    #[test]
    fn test_stream_error_keeps_last_snapshot() {
        crate::logging::init_test();
        let store = ScriptedStore::default();
        let notifier = RecordingNotifier::default();
        let mut live = LiveEntries::new(ProductionType::Garments);

        live.start(&store, "u", ProductionType::Garments).unwrap();
        store.push(Ok(vec![entry("g1", ProductionType::Garments)]));
        live.pump(&notifier);

        store.push(Err(anyhow!("permission denied")));
        assert!(!live.pump(&notifier));
        assert_eq!(live.entries().len(), 1);
        assert!(!live.is_loading());
        assert_eq!(
            *notifier.toasts.borrow(),
            vec![(FETCH_FAILED.to_string(), Severity::Error)]
        );
    }

    #[test]
    fn test_sign_out_clears_and_stops_listening() {
        let store = ScriptedStore::default();
        let notifier = RecordingNotifier::default();
        let mut live = LiveEntries::new(ProductionType::Knitting);

        live.start(&store, "u", ProductionType::Knitting).unwrap();
        store.push(Ok(vec![entry("k1", ProductionType::Knitting)]));
        live.pump(&notifier);

        live.sign_out();
        assert!(live.entries().is_empty());
        assert_eq!(live.owner(), None);
        assert!(!live.pump(&notifier));

        // Switching type while signed out subscribes to nothing.
        live.switch_type(&store, ProductionType::Dyeing).unwrap();
        assert_eq!(live.production_type(), ProductionType::Dyeing);
        assert_eq!(store.senders.borrow().len(), 1);
    }

    #[test]
    fn test_switch_type_resubscribes() {
        let dir = tempdir().unwrap();
        let store = FileEntryStore::new(Some(dir.path().to_path_buf())).unwrap();
        let path = CollectionPath::production_entries("u");
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        store.create(&path, EntryRecord::new(ProductionType::Knitting, day)).unwrap();
        store.create(&path, EntryRecord::new(ProductionType::Dyeing, day)).unwrap();
        store.create(&path, EntryRecord::new(ProductionType::Dyeing, day)).unwrap();

        let notifier = RecordingNotifier::default();
        let mut live = LiveEntries::new(ProductionType::Knitting);
        live.start(&store, "u", ProductionType::Knitting).unwrap();
        live.pump(&notifier);
        assert_eq!(live.entries().len(), 1);

        live.switch_type(&store, ProductionType::Dyeing).unwrap();
        assert!(live.is_loading());
        live.pump(&notifier);
        assert_eq!(live.entries().len(), 2);
        assert!(live.entries().iter().all(|e| e.kind() == ProductionType::Dyeing));

        store.create(&path, EntryRecord::new(ProductionType::Dyeing, day)).unwrap();
        assert!(live.pump(&notifier));
        assert_eq!(live.entries().len(), 3);
        assert!(notifier.toasts.borrow().is_empty());
    }
}
