use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("activity {0} does not exist in this dataset")]
    UnknownActivity(Uuid),
    #[error("activity {0} already exists in this dataset")]
    DuplicateActivity(Uuid),
    #[error("no dataset is loaded")]
    NoDataset,
    #[error("store rejected the update: {0}")]
    Rejected(String),
}

/// Failures while importing an operational-approach CSV.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV is missing required columns (found {found:?}); need Objective, LOE and IMO")]
    MissingColumns { found: Vec<String> },
    #[error("no usable rows found ({skipped} rows skipped)")]
    Empty { skipped: usize },
}

/// Failures while writing a CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A committed reorder could not be turned into a renumbering batch.
#[derive(Debug, Error, PartialEq)]
pub enum RenumberError {
    #[error("dragged {level} `{key}` is not among its expected siblings")]
    EntityNotFound { level: &'static str, key: String },
}
