pub mod draft;
pub mod entry;
pub mod stats;
