//! Namespace store: the live, multi-section settings state presets are applied to.
//!
//! Each namespace is a handler behind the [`Namespace`] trait. The store is an
//! explicit registry from name to handler, built once at startup; lookups of
//! names that were never registered fail with [`EngineError::UnknownNamespace`]
//! so callers can decide to skip them.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::EngineError;
use crate::model::{PartialSettings, NAME_KEY};

/// Interface every namespace handler exposes to the preset controller.
pub trait Namespace {
    /// Deep-merge `partial` into the live settings.
    fn update(&mut self, partial: &PartialSettings);

    /// Restore the given top-level keys to their baseline values.
    fn reset(&mut self, keys: &[String]);

    /// True iff every top-level key of `partial` still holds exactly what
    /// writing `partial` over the baseline produced. Siblings inside a key
    /// count, since `reset` restores the key as a whole.
    fn is_equal(&self, partial: &PartialSettings) -> bool;

    /// Restore the whole namespace to its baseline.
    fn reset_all(&mut self);

    /// Copy of the live settings.
    fn snapshot(&self) -> PartialSettings;
}

// ---------------------------------------------------------------------------
// SettingsNamespace
// ---------------------------------------------------------------------------

/// A namespace backed by a JSON object with a fixed baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsNamespace {
    baseline: PartialSettings,
    live: PartialSettings,
}

impl SettingsNamespace {
    pub fn new(baseline: PartialSettings) -> Self {
        Self { live: baseline.clone(), baseline }
    }

    pub fn baseline(&self) -> &PartialSettings {
        &self.baseline
    }

    pub fn live(&self) -> &PartialSettings {
        &self.live
    }
}

impl Namespace for SettingsNamespace {
    fn update(&mut self, partial: &PartialSettings) {
        deep_merge(&mut self.live, partial);
    }

    fn reset(&mut self, keys: &[String]) {
        for key in keys {
            match self.baseline.get(key) {
                Some(value) => {
                    self.live.insert(key.clone(), value.clone());
                }
                None => {
                    self.live.remove(key);
                }
            }
        }
    }

    fn is_equal(&self, partial: &PartialSettings) -> bool {
        partial.iter().all(|(key, written)| {
            let Some(live) = self.live.get(key) else {
                return false;
            };
            match (self.baseline.get(key), written) {
                (Some(Value::Object(base)), Value::Object(nested)) => {
                    let mut expected = base.clone();
                    deep_merge(&mut expected, nested);
                    match live {
                        Value::Object(live) => objects_equal(&expected, live),
                        _ => false,
                    }
                }
                _ => values_equal(written, live),
            }
        })
    }

    fn reset_all(&mut self) {
        self.live = self.baseline.clone();
    }

    fn snapshot(&self) -> PartialSettings {
        self.live.clone()
    }
}

/// Merge `source` into `target`: objects merge recursively, everything else overwrites.
pub fn deep_merge(target: &mut PartialSettings, source: &PartialSettings) {
    for (key, incoming) in source {
        if let (Some(Value::Object(existing)), Value::Object(nested)) = (target.get_mut(key), incoming) {
            deep_merge(existing, nested);
            continue;
        }
        target.insert(key.clone(), incoming.clone());
    }
}

fn objects_equal(a: &PartialSettings, b: &PartialSettings) -> bool {
    a.len() == b.len()
        && a.iter().all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
}

// 1 and 1.0 are the same setting value even though serde_json keeps them apart.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Object(x), Value::Object(y)) => objects_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        _ => a == b,
    }
}

// ---------------------------------------------------------------------------
// NamespaceStore
// ---------------------------------------------------------------------------

/// Registry of namespace handlers in registration order.
#[derive(Default)]
pub struct NamespaceStore {
    namespaces: Vec<(String, Box<dyn Namespace>)>,
}

impl fmt::Debug for NamespaceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceStore")
            .field("namespaces", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl NamespaceStore {
    pub fn new() -> Self {
        Self { namespaces: Vec::new() }
    }

    /// Build a store of [`SettingsNamespace`]s from `(name, baseline)` pairs.
    pub fn from_baselines<I>(baselines: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (String, PartialSettings)>,
    {
        let mut store = Self::new();
        for (name, baseline) in baselines {
            store.register(name, SettingsNamespace::new(baseline))?;
        }
        Ok(store)
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        namespace: impl Namespace + 'static,
    ) -> Result<(), EngineError> {
        let name = name.into();
        if name.trim().is_empty() || name == NAME_KEY {
            return Err(EngineError::InvalidNamespaceName(name));
        }
        if self.contains(&name) {
            return Err(EngineError::DuplicateNamespace(name));
        }
        self.namespaces.push((name, Box::new(namespace)));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.namespaces.iter().any(|(ns, _)| ns == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(|(ns, _)| ns.as_str())
    }

    pub fn get(&self, name: &str) -> Result<&dyn Namespace, EngineError> {
        self.namespaces
            .iter()
            .find(|(ns, _)| ns == name)
            .map(|(_, handler)| &**handler)
            .ok_or_else(|| EngineError::UnknownNamespace(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Box<dyn Namespace>, EngineError> {
        self.namespaces
            .iter_mut()
            .find(|(ns, _)| ns == name)
            .map(|(_, handler)| handler)
            .ok_or_else(|| EngineError::UnknownNamespace(name.to_string()))
    }

    pub fn update(&mut self, name: &str, partial: &PartialSettings) -> Result<(), EngineError> {
        self.get_mut(name)?.update(partial);
        Ok(())
    }

    pub fn reset(&mut self, name: &str, keys: &[String]) -> Result<(), EngineError> {
        self.get_mut(name)?.reset(keys);
        Ok(())
    }

    pub fn is_equal(&self, name: &str, partial: &PartialSettings) -> Result<bool, EngineError> {
        Ok(self.get(name)?.is_equal(partial))
    }

    /// Restore every namespace to its baseline.
    pub fn reset_all(&mut self) {
        for (_, handler) in &mut self.namespaces {
            handler.reset_all();
        }
    }

    /// Live settings of every namespace, keyed by name.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.namespaces
            .iter()
            .map(|(ns, handler)| (ns.clone(), Value::Object(handler.snapshot())))
            .collect()
    }
}
