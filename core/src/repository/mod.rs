pub mod file;
pub mod traits;

// Re-export
pub use file::FileEntryStore;
pub use traits::{CollectionPath, EntryStore, Snapshot, Subscription, PRODUCTION_ENTRIES};
