// Preset catalog - ordered, append-only list shown to the operator

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::Preset;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self { presets: Vec::new() }
    }

    /// Parse static definitions: a JSON array of flat preset objects.
    pub fn from_json(input: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn push(&mut self, preset: Preset) {
        self.presets.push(preset);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    /// First preset with this name. Names are not unique.
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Extend<Preset> for PresetCatalog {
    fn extend<I: IntoIterator<Item = Preset>>(&mut self, iter: I) {
        self.presets.extend(iter);
    }
}

impl<'a> IntoIterator for &'a PresetCatalog {
    type Item = &'a Preset;
    type IntoIter = std::slice::Iter<'a, Preset>;

    fn into_iter(self) -> Self::IntoIter {
        self.presets.iter()
    }
}
