use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::FetchError;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Parameter '{parameter}' has {found} values but the time axis has {expected}")]
    SeriesLength {
        parameter: String,
        expected: usize,
        found: usize,
    },

    #[error("Failed to read child file '{path}': {source}")]
    ChildFile {
        path: PathBuf,
        #[source]
        source: Box<ProcessingError>,
    },

    #[error("Parent '{0}' has no child directories")]
    NoChildren(String),

    #[error("Child '{child}' of '{parent}' is misaligned in {frequency} series: {details}")]
    MisalignedBuckets {
        parent: String,
        child: String,
        frequency: String,
        details: String,
    },

    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Aggregation failed for {failed} of {total} parents")]
    AggregationFailed { failed: usize, total: usize },

    #[error("Ingest failed for {failed} entities")]
    IngestFailed { failed: usize },

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
