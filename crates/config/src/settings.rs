// Preset configuration
// Loaded from ~/.config/presetlab/presetlab.toml

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ConfigError;

/// Column names that always carry the preset name, never a setting.
pub const NAME_COLUMNS: &[&str] = &["name", "Name"];

/// Primitive type a tabular cell is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Number,
    Bool,
    String,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Where a tabular column lands inside a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub namespace: String,
    /// Dot-separated path inside the namespace, e.g. `softening.strength`.
    pub path: String,
    #[serde(default)]
    pub kind: ValueKind,
}

impl ColumnSpec {
    pub fn new(namespace: &str, path: &str, kind: ValueKind) -> Self {
        Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
            kind,
        }
    }
}

/// Column header -> destination.
pub type ColumnMap = BTreeMap<String, ColumnSpec>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Forced CSV delimiter. None = sniff from content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    /// Extensions (lowercase, no dot) counted as images in archive listings.
    pub image_extensions: Vec<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            delimiter: None,
            image_extensions: ["png", "jpg", "jpeg", "gif", "webp", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Baseline settings per namespace, in registration order.
    pub namespaces: Map<String, Value>,
    pub columns: ColumnMap,
    pub ingest: IngestSettings,
}

impl Default for PresetConfig {
    fn default() -> Self {
        let namespaces = json!({
            "skin": {
                "softening": {"strength": 0.0},
                "color": "0 0 0 0"
            },
            "eyes": {
                "whitening": {"strength": 0.0},
                "flare": {"strength": 0.0},
                "eyelashes": {"enabled": false}
            },
            "teeth": {
                "whitening": {"strength": 0.0}
            },
            "lips": {
                "color": "0 0 0 0"
            },
            "morphs": {
                "face": {"strength": 0.0},
                "eyes": {"strength": 0.0},
                "nose": {"strength": 0.0}
            }
        });

        let columns = [
            ("FaceMorph", ColumnSpec::new("morphs", "face.strength", ValueKind::Number)),
            ("EyesMorph", ColumnSpec::new("morphs", "eyes.strength", ValueKind::Number)),
            ("NoseMorph", ColumnSpec::new("morphs", "nose.strength", ValueKind::Number)),
            ("SkinSoftening", ColumnSpec::new("skin", "softening.strength", ValueKind::Number)),
            ("SkinColor", ColumnSpec::new("skin", "color", ValueKind::String)),
            ("EyesWhitening", ColumnSpec::new("eyes", "whitening.strength", ValueKind::Number)),
            ("EyesFlare", ColumnSpec::new("eyes", "flare.strength", ValueKind::Number)),
            ("EyelashesEnabled", ColumnSpec::new("eyes", "eyelashes.enabled", ValueKind::Bool)),
            ("TeethWhitening", ColumnSpec::new("teeth", "whitening.strength", ValueKind::Number)),
            ("LipsColor", ColumnSpec::new("lips", "color", ValueKind::String)),
        ]
        .into_iter()
        .map(|(column, spec)| (column.to_string(), spec))
        .collect();

        Self {
            namespaces: match namespaces {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            columns,
            ingest: IngestSettings::default(),
        }
    }
}

impl PresetConfig {
    /// Default config file location.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("presetlab")
            .join("presetlab.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: PresetConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Load from the default location, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, baseline) in &self.namespaces {
            if name.trim().is_empty() || NAME_COLUMNS.contains(&name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "invalid namespace name '{name}'"
                )));
            }
            if !baseline.is_object() {
                return Err(ConfigError::Validation(format!(
                    "namespace '{name}': baseline must be a table"
                )));
            }
        }

        for (column, spec) in &self.columns {
            if NAME_COLUMNS.contains(&column.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "column '{column}' is reserved for the preset name"
                )));
            }
            if !self.namespaces.contains_key(&spec.namespace) {
                return Err(ConfigError::Validation(format!(
                    "column '{column}': unknown namespace '{}'",
                    spec.namespace
                )));
            }
            if spec.path.is_empty() || spec.path.split('.').any(str::is_empty) {
                return Err(ConfigError::Validation(format!(
                    "column '{column}': invalid path '{}'",
                    spec.path
                )));
            }
        }

        // The CSV reader splits on a single byte
        if let Some(delimiter) = self.ingest.delimiter {
            if !delimiter.is_ascii() {
                return Err(ConfigError::Validation(format!(
                    "ingest.delimiter '{delimiter}' must be a single ASCII character"
                )));
            }
        }

        Ok(())
    }

    /// `(namespace, baseline)` pairs in declaration order.
    pub fn baselines(&self) -> Vec<(String, Map<String, Value>)> {
        self.namespaces
            .iter()
            .filter_map(|(name, value)| value.as_object().map(|obj| (name.clone(), obj.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PresetConfig::default();
        config.validate().unwrap();
        assert_eq!(config.columns.len(), 10);
        let names: Vec<String> = config.baselines().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["skin", "eyes", "teeth", "lips", "morphs"]);
    }

    #[test]
    fn parse_minimal_toml() {
        let config = PresetConfig::from_toml(
            r#"
[namespaces.skin]
softening = { strength = 0.0 }

[columns.Softness]
namespace = "skin"
path = "softening.strength"
"#,
        )
        .unwrap();

        assert_eq!(config.columns["Softness"].kind, ValueKind::Number);
        assert_eq!(config.namespaces["skin"]["softening"]["strength"], json!(0.0));
        // ingest section falls back to defaults
        assert!(config.ingest.image_extensions.contains(&"png".to_string()));
        assert_eq!(config.ingest.delimiter, None);
    }

    #[test]
    fn reject_column_with_unknown_namespace() {
        let err = PresetConfig::from_toml(
            r#"
[namespaces.skin]
color = ""

[columns.HairColor]
namespace = "hair"
path = "color"
kind = "string"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown namespace 'hair'"), "got: {err}");
    }

    #[test]
    fn reject_reserved_and_malformed_columns() {
        let reserved = PresetConfig::from_toml(
            r#"
[namespaces.skin]
color = ""
[columns.Name]
namespace = "skin"
path = "color"
"#,
        );
        assert!(matches!(reserved, Err(ConfigError::Validation(_))));

        let bad_path = PresetConfig::from_toml(
            r#"
[namespaces.skin]
color = ""
[columns.Color]
namespace = "skin"
path = "color..x"
"#,
        );
        assert!(matches!(bad_path, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn reject_scalar_namespace_baseline() {
        let err = PresetConfig::from_toml("[namespaces]\nskin = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn reject_unknown_kind() {
        let err = PresetConfig::from_toml(
            r#"
[namespaces.skin]
color = ""
[columns.Color]
namespace = "skin"
path = "color"
kind = "colour"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn reject_non_ascii_delimiter() {
        let err = PresetConfig::from_toml("[ingest]\ndelimiter = \"§\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got: {err}");
        assert!(err.to_string().contains("ASCII"), "got: {err}");

        let config = PresetConfig::from_toml("[ingest]\ndelimiter = \";\"\n").unwrap();
        assert_eq!(config.ingest.delimiter, Some(';'));
    }

    #[test]
    fn toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presetlab.toml");
        let config = PresetConfig::default();
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = PresetConfig::load_from(&path).unwrap();
        assert_eq!(loaded.columns, config.columns);
        assert_eq!(loaded.baselines().len(), 5);
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PresetConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
