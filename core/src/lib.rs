pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use config::Config;
pub use error::{EntryError, StoreError};
pub use input::{expand_key, parse_fields, ParsedInput};
pub use metrics::{compute_efficiency, compute_total_hours, format_total_hours};
pub use model::draft::EntryDraft;
pub use model::entry::{EntryDetails, EntryRecord, ProductionEntry, ProductionType, QualityGrade, Shift};
pub use model::stats::{ChartMode, ProductionStats};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use repository::{CollectionPath, EntryStore, FileEntryStore};
pub use service::dto::EntryRow;
pub use service::entry_service::EntryService;
pub use service::filter::{DateRange, EntryFilter};
pub use service::live_entries::LiveEntries;
pub use time::{parse_human_date, parse_local_datetime};
pub use usecase::report::{ProductionReport, ReportUseCase};
