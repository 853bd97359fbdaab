// Preset ingestion from external sources

pub mod archive;
pub mod csv;
pub mod error;
pub mod tabular;

pub use archive::ArchiveIngestor;
pub use error::IngestError;
pub use tabular::TabularIngestor;
