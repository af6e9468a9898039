use thiserror::Error;

use crate::model::entry::ProductionType;

/// Failures raised while composing or submitting an entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("unknown field '{field}' for {kind} entries")]
    UnknownField { field: String, kind: ProductionType },

    #[error("'{0}' is calculated automatically and cannot be set")]
    DerivedField(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error("no production entry matches '{0}'")]
    NotFound(String),

    #[error("'{prefix}' is ambiguous, it matches {count} entries")]
    AmbiguousId { prefix: String, count: usize },
}

/// Failures raised by an entry store on a single document operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("entry {0} not found")]
    NotFound(String),

    #[error("entry {id} is a {existing} entry and cannot become {requested}")]
    TypeChanged {
        id: String,
        existing: ProductionType,
        requested: ProductionType,
    },
}
