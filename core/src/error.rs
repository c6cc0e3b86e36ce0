use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("Dataset unavailable at {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("Schema mismatch: missing columns {missing:?}")]
    SchemaMismatch { missing: Vec<String> },

    #[error("Domain violation: field '{field}' has value '{value}'")]
    DomainViolation { field: &'static str, value: String },

    #[error("Invalid row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: Box<ChurnError>,
    },

    #[error("Degenerate aggregate: {reason}")]
    DegenerateAggregate { reason: String },

    #[error("Invalid grouping: {reason}")]
    InvalidGrouping { reason: String },

    #[error("Unknown field '{name}'")]
    UnknownField { name: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChurnError {
    pub fn domain(field: &'static str, value: impl Into<String>) -> Self {
        Self::DomainViolation { field, value: value.into() }
    }

    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateAggregate { reason: reason.into() }
    }
}

pub type ChurnResult<T> = Result<T, ChurnError>;
