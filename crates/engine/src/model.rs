//! Preset data model.
//!
//! A [`Preset`] is a name plus a [`Delta`]: an ordered list of
//! `(namespace, partial settings)` pairs. Partial settings are plain JSON
//! objects so presets can carry arbitrarily nested values without a schema.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nested mapping of setting-path -> value for a single namespace.
/// Absent keys mean "not specified".
pub type PartialSettings = Map<String, Value>;

/// Reserved key holding the preset name in the flat authoring format.
pub const NAME_KEY: &str = "name";

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// Namespace-scoped settings in authoring order.
///
/// Iteration order is insertion order; inserting an existing namespace
/// replaces its partial in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    entries: Vec<(String, PartialSettings)>,
}

impl Delta {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, namespace: impl Into<String>, partial: PartialSettings) {
        let namespace = namespace.into();
        match self.entries.iter_mut().find(|(ns, _)| *ns == namespace) {
            Some((_, existing)) => *existing = partial,
            None => self.entries.push((namespace, partial)),
        }
    }

    /// Mutable access to a namespace partial, creating an empty one if needed.
    pub fn entry(&mut self, namespace: &str) -> &mut PartialSettings {
        let idx = match self.entries.iter().position(|(ns, _)| ns == namespace) {
            Some(idx) => idx,
            None => {
                self.entries.push((namespace.to_string(), PartialSettings::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, namespace: &str) -> Option<&PartialSettings> {
        self.entries
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, partial)| partial)
    }

    pub fn remove(&mut self, namespace: &str) -> Option<PartialSettings> {
        let idx = self.entries.iter().position(|(ns, _)| ns == namespace)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PartialSettings)> {
        self.entries.iter().map(|(ns, partial)| (ns.as_str(), partial))
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(ns, _)| ns.as_str())
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &PartialSettings) -> bool) {
        self.entries.retain(|(ns, partial)| keep(ns, partial));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, PartialSettings)> for Delta {
    fn from_iter<I: IntoIterator<Item = (String, PartialSettings)>>(iter: I) -> Self {
        let mut delta = Delta::new();
        for (ns, partial) in iter {
            delta.insert(ns, partial);
        }
        delta
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (ns, partial) in &self.entries {
            map.serialize_entry(ns, partial)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        delta_from_map(map).map_err(de::Error::custom)
    }
}

fn delta_from_map(map: Map<String, Value>) -> Result<Delta, String> {
    let mut delta = Delta::new();
    for (ns, value) in map {
        match value {
            Value::Object(partial) => delta.insert(ns, partial),
            other => {
                return Err(format!(
                    "namespace '{ns}' must be an object, got {}",
                    json_kind(&other)
                ))
            }
        }
    }
    Ok(delta)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

/// A named bundle of namespace-scoped settings.
///
/// Serialized flat, the way catalog authors write them:
/// `{"name": "Glow", "skin": {"softening": {"strength": 0.8}}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    name: String,
    namespaces: Delta,
}

impl Preset {
    /// Build a preset. A stray `name` namespace is dropped so the name never
    /// leaks into the delta.
    pub fn new(name: impl Into<String>, mut namespaces: Delta) -> Self {
        namespaces.remove(NAME_KEY);
        Self { name: name.into(), namespaces }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespaces(&self) -> &Delta {
        &self.namespaces
    }
}

impl Serialize for Preset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.namespaces.len() + 1))?;
        map.serialize_entry(NAME_KEY, &self.name)?;
        for (ns, partial) in self.namespaces.iter() {
            map.serialize_entry(ns, partial)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        let name = match map.remove(NAME_KEY) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "preset name must be a string, got {}",
                    json_kind(&other)
                )))
            }
            None => return Err(de::Error::missing_field(NAME_KEY)),
        };
        let namespaces = delta_from_map(map).map_err(de::Error::custom)?;
        Ok(Preset { name, namespaces })
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Write `value` at a dot-separated path, creating intermediate objects.
/// A non-object value in the way is replaced by an object.
pub fn set_path(target: &mut PartialSettings, path: &str, value: Value) {
    let mut segments = path.split('.').filter(|s| !s.is_empty()).peekable();
    let mut current = target;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }
}

/// Read the value at a dot-separated path.
pub fn get_path<'a>(source: &'a PartialSettings, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.').filter(|s| !s.is_empty());
    let first = segments.next()?;
    let mut current = source.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> PartialSettings {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn preset_new_strips_name_namespace() {
        let mut delta = Delta::new();
        delta.insert("name", obj(json!({"x": 1})));
        delta.insert("skin", obj(json!({"softening": {"strength": 0.8}})));

        let preset = Preset::new("Glow", delta);
        assert_eq!(preset.name(), "Glow");
        assert_eq!(preset.namespaces().len(), 1);
        assert!(preset.namespaces().get("name").is_none());
    }

    #[test]
    fn preset_deserializes_flat_format_in_order() {
        let preset: Preset = serde_json::from_str(
            r#"{"teeth": {"whitening": {"strength": 1}}, "name": "Smile", "eyes": {"flare": {"strength": 0.3}}}"#,
        )
        .unwrap();

        assert_eq!(preset.name(), "Smile");
        let order: Vec<&str> = preset.namespaces().namespaces().collect();
        assert_eq!(order, vec!["teeth", "eyes"]);
    }

    #[test]
    fn preset_rejects_missing_name_and_scalar_namespace() {
        let missing = serde_json::from_str::<Preset>(r#"{"skin": {}}"#);
        assert!(missing.is_err());

        let scalar = serde_json::from_str::<Preset>(r#"{"name": "x", "skin": 3}"#);
        let err = scalar.unwrap_err().to_string();
        assert!(err.contains("namespace 'skin' must be an object"), "got: {err}");
    }

    #[test]
    fn preset_serializes_name_first() {
        let mut delta = Delta::new();
        delta.insert("lips", obj(json!({"color": "0.8 0.1 0.2 0.6"})));
        let preset = Preset::new("Red", delta);

        let text = serde_json::to_string(&preset).unwrap();
        assert_eq!(text, r#"{"name":"Red","lips":{"color":"0.8 0.1 0.2 0.6"}}"#);
    }

    #[test]
    fn delta_insert_replaces_in_place() {
        let mut delta = Delta::new();
        delta.insert("skin", obj(json!({"a": 1})));
        delta.insert("eyes", obj(json!({"b": 2})));
        delta.insert("skin", obj(json!({"a": 3})));

        let order: Vec<&str> = delta.namespaces().collect();
        assert_eq!(order, vec!["skin", "eyes"]);
        assert_eq!(delta.get("skin").unwrap()["a"], json!(3));
    }

    #[test]
    fn set_path_creates_nested_objects() {
        let mut partial = PartialSettings::new();
        set_path(&mut partial, "softening.strength", json!(0.5));
        set_path(&mut partial, "color", json!("0 0 0 0"));
        assert_eq!(Value::Object(partial.clone()), json!({"softening": {"strength": 0.5}, "color": "0 0 0 0"}));
        assert_eq!(get_path(&partial, "softening.strength"), Some(&json!(0.5)));
        assert_eq!(get_path(&partial, "softening.missing"), None);
    }

    #[test]
    fn set_path_overwrites_scalar_in_the_way() {
        let mut partial = obj(json!({"softening": 1}));
        set_path(&mut partial, "softening.strength", json!(0.2));
        assert_eq!(Value::Object(partial), json!({"softening": {"strength": 0.2}}));
    }
}
