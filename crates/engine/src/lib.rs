//! `presetlab-engine` — preset apply/revert engine.
//!
//! Pure engine crate: owns the preset data model, the namespace store
//! contract, the controller that applies and selectively reverts presets,
//! and the catalog presets are picked from. No file IO.

pub mod catalog;
pub mod controller;
pub mod error;
pub mod events;
pub mod model;
pub mod store;

pub use catalog::PresetCatalog;
pub use controller::{PresetController, RevertReport};
pub use error::EngineError;
pub use events::{EventBus, EventCollector, PresetApplied, SubscriptionId, PRESET_APPLIED};
pub use model::{Delta, PartialSettings, Preset};
pub use store::{Namespace, NamespaceStore, SettingsNamespace};
