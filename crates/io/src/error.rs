use std::path::PathBuf;

use presetlab_config::ValueKind;
use thiserror::Error;

/// Errors surfaced through the ingestion error callback.
///
/// Row numbers are 1-based source record numbers (the header is row 0). A
/// record that failed to parse keeps its number, so later rows are not shifted.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Header row missing or unreadable; nothing was ingested.
    #[error("tabular header error: {0}")]
    Header(String),
    /// CSV-level error on a single record.
    #[error("row {row}: {message}")]
    Record { row: usize, message: String },
    #[error("row {row}: missing preset name")]
    MissingName { row: usize },
    #[error("row {row}, column '{column}': cannot parse '{value}' as {kind}")]
    BadValue {
        row: usize,
        column: String,
        value: String,
        kind: ValueKind,
    },
    /// Archive could not be decoded; the previous entry list is kept.
    #[error("archive decode error: {0}")]
    Archive(#[from] zip::result::ZipError),
}
