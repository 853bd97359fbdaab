// Configuration loading

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{ColumnMap, ColumnSpec, IngestSettings, PresetConfig, ValueKind, NAME_COLUMNS};
