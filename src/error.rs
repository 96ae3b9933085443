use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced while ingesting CSV inputs or resolving timestamps.
///
/// Every variant aborts the current ingestion call; no partial results are
/// returned. Row numbers are 1-based and count the header line as row 1.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("CSV file is empty: {}", .path.display())]
    EmptyFile { path: PathBuf },

    #[error("invalid headers in {}: expected {:?}, got {:?}", .path.display(), .expected, .got)]
    HeaderMismatch {
        path: PathBuf,
        expected: &'static [&'static str],
        got: Vec<String>,
    },

    #[error("empty domain or agent name in {} at row {}", .path.display(), .row)]
    EmptyField { path: PathBuf, row: usize },

    #[error("invalid row format in {} at row {}", .path.display(), .row)]
    MalformedRow { path: PathBuf, row: usize },

    #[error("no data records found in CSV: {}", .path.display())]
    NoRecords { path: PathBuf },

    #[error("invalid date format: '{}' (supported formats include 'YYYY-MM-DD HH:MM:SS' and 'Jan 31, 2026 @ 12:38:00.504')", .value)]
    InvalidDateFormat { value: String },

    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
