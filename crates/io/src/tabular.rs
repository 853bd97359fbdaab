//! Tabular preset ingestion.
//!
//! One row per preset: a `name`/`Name` column plus feature columns mapped by a
//! [`ColumnMap`] to nested namespace paths. Rows are independent; a bad row is
//! reported through the error callback and skipped, never aborting the batch.

use std::path::PathBuf;

use presetlab_config::{ColumnMap, ColumnSpec, PresetConfig, ValueKind, NAME_COLUMNS};
use presetlab_engine::model::set_path;
use presetlab_engine::{Delta, Preset, PresetCatalog};
use serde_json::{Number, Value};

use crate::csv::{decode_text, parse_rows, Row};
use crate::error::IngestError;

#[derive(Debug, Clone)]
pub struct TabularIngestor {
    columns: ColumnMap,
    delimiter: Option<u8>,
}

impl Default for TabularIngestor {
    fn default() -> Self {
        Self::from_config(&PresetConfig::default())
    }
}

impl TabularIngestor {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns, delimiter: None }
    }

    pub fn from_config(config: &PresetConfig) -> Self {
        // validate() rejects non-ASCII delimiters; a hand-built config falls back to sniffing
        let delimiter = config.ingest.delimiter.filter(char::is_ascii).map(|c| c as u8);
        Self { columns: config.columns.clone(), delimiter }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Build one preset from a row. Errors carry the row's source number.
    pub fn build_preset(&self, row: &Row) -> Result<Preset, IngestError> {
        let name = NAME_COLUMNS
            .iter()
            .filter_map(|col| row.get(col))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .ok_or(IngestError::MissingName { row: row.number })?;

        let mut delta = Delta::new();
        // Namespaces enter the delta in the order their first column appears in the header
        for (column, raw) in row.iter() {
            let Some(spec) = self.columns.get(column) else { continue };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let value = coerce(raw, spec.kind).ok_or_else(|| IngestError::BadValue {
                row: row.number,
                column: column.to_string(),
                value: raw.to_string(),
                kind: spec.kind,
            })?;
            write(&mut delta, spec, value);
        }

        Ok(Preset::new(name, delta))
    }

    /// Append one preset per valid row, in row order. Returns how many were appended.
    pub fn ingest(
        &self,
        rows: &[Row],
        catalog: &mut PresetCatalog,
        mut on_error: impl FnMut(IngestError),
    ) -> usize {
        let mut appended = 0;
        for row in rows {
            match self.build_preset(row) {
                Ok(preset) => {
                    log::debug!("ingested preset '{}'", preset.name());
                    catalog.push(preset);
                    appended += 1;
                }
                Err(e) => {
                    log::warn!("{e}");
                    on_error(e);
                }
            }
        }
        log::info!("ingested {appended} of {} row(s)", rows.len());
        appended
    }

    /// Parse delimited text, then ingest it.
    pub fn ingest_text(
        &self,
        content: &str,
        catalog: &mut PresetCatalog,
        mut on_error: impl FnMut(IngestError),
    ) -> usize {
        let rows = parse_rows(content, self.delimiter, &mut on_error);
        self.ingest(&rows, catalog, on_error)
    }

    /// Read and parse a file off the calling task, then ingest it.
    pub async fn ingest_path(
        &self,
        path: impl Into<PathBuf>,
        catalog: &mut PresetCatalog,
        mut on_error: impl FnMut(IngestError),
    ) -> usize {
        let path = path.into();
        let delimiter = self.delimiter;

        let parsed = smol::unblock(move || {
            let bytes = std::fs::read(&path).map_err(|source| IngestError::Io { path, source })?;
            let mut errors = Vec::new();
            let rows = parse_rows(&decode_text(bytes), delimiter, |e| errors.push(e));
            Ok::<_, IngestError>((rows, errors))
        })
        .await;

        match parsed {
            Ok((rows, errors)) => {
                for e in errors {
                    on_error(e);
                }
                self.ingest(&rows, catalog, on_error)
            }
            Err(e) => {
                log::warn!("{e}");
                on_error(e);
                0
            }
        }
    }
}

fn write(delta: &mut Delta, spec: &ColumnSpec, value: Value) {
    set_path(delta.entry(&spec.namespace), &spec.path, value);
}

/// Coerce a non-empty cell to the column's declared kind.
pub fn coerce(raw: &str, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::Number => {
            let n: f64 = raw.parse().ok()?;
            Number::from_f64(n).map(Value::Number)
        }
        ValueKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Some(Value::Bool(false)),
            _ => None,
        },
        ValueKind::String => Some(Value::String(raw.to_string())),
    }
}
