use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The store has no namespace registered under this name.
    #[error("unknown namespace: {0}")]
    UnknownNamespace(String),
    /// Namespace names must be non-empty and must not collide with the preset name key.
    #[error("invalid namespace name: '{0}'")]
    InvalidNamespaceName(String),
    #[error("namespace '{0}' is already registered")]
    DuplicateNamespace(String),
    /// No preset with this name in the catalog.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    /// Catalog JSON could not be parsed.
    #[error("catalog parse error: {0}")]
    CatalogParse(#[from] serde_json::Error),
}
