//! Preset controller: apply a preset and later revert exactly what it wrote.
//!
//! The controller tracks a single active delta. `apply` always starts from
//! baseline (`reset_all`) and then writes the preset; `reset_active` reverts
//! a namespace only while it still holds the values the delta wrote, so edits
//! made after the apply survive.

use log::{debug, info};

use crate::catalog::PresetCatalog;
use crate::error::EngineError;
use crate::events::{EventBus, PresetApplied, SubscriptionId};
use crate::model::{Delta, Preset};
use crate::store::NamespaceStore;

/// Outcome of [`PresetController::reset_active`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevertReport {
    /// Namespaces restored to baseline for the delta's keys.
    pub reverted: Vec<String>,
    /// Namespaces left alone because they changed since apply.
    pub preserved: Vec<String>,
}

impl RevertReport {
    /// True when there was no active preset to revert.
    pub fn is_noop(&self) -> bool {
        self.reverted.is_empty() && self.preserved.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct PresetController {
    active: Option<Delta>,
    events: EventBus,
}

impl PresetController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta of the last applied preset, restricted to known namespaces.
    pub fn active(&self) -> Option<&Delta> {
        self.active.as_ref()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&PresetApplied) + 'static) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Reset the store to baseline, then write `preset` into it.
    ///
    /// Replaces any previously tracked delta. Namespaces the store doesn't
    /// know are skipped and never tracked.
    pub fn apply(&mut self, store: &mut NamespaceStore, preset: &Preset) {
        let delta = preset.namespaces();

        let mut tracked = delta.clone();
        tracked.retain(|ns, _| {
            let known = store.contains(ns);
            if !known {
                debug!("preset '{}': skipping unknown namespace '{}'", preset.name(), ns);
            }
            known
        });
        self.active = Some(tracked);

        store.reset_all();

        for (ns, partial) in delta.iter() {
            if let Err(e) = store.update(ns, partial) {
                debug!("preset '{}': {}", preset.name(), e);
            }
        }

        info!(
            "applied preset '{}' ({} namespace(s))",
            preset.name(),
            self.active.as_ref().map_or(0, Delta::len)
        );
        self.events.publish(&PresetApplied::applied(delta.clone()));
    }

    /// Look up `name` in the catalog and apply the first match.
    pub fn apply_by_name(
        &mut self,
        store: &mut NamespaceStore,
        catalog: &PresetCatalog,
        name: &str,
    ) -> Result<(), EngineError> {
        let preset = catalog
            .find(name)
            .ok_or_else(|| EngineError::UnknownPreset(name.to_string()))?;
        self.apply(store, preset);
        Ok(())
    }

    /// Revert the active preset, namespace by namespace.
    ///
    /// A namespace is reset (for the keys the delta wrote) only while its live
    /// value still equals what the delta wrote. Always clears tracking. No-op
    /// without an active preset.
    pub fn reset_active(&mut self, store: &mut NamespaceStore) -> RevertReport {
        let Some(delta) = self.active.take() else {
            return RevertReport::default();
        };

        let mut report = RevertReport::default();
        for (ns, partial) in delta.iter() {
            match store.is_equal(ns, partial) {
                Ok(true) => {
                    let keys: Vec<String> = partial.keys().cloned().collect();
                    match store.reset(ns, &keys) {
                        Ok(()) => report.reverted.push(ns.to_string()),
                        Err(e) => debug!("revert: {}", e),
                    }
                }
                Ok(false) => {
                    debug!("revert: '{}' changed since apply, keeping user edits", ns);
                    report.preserved.push(ns.to_string());
                }
                Err(e) => debug!("revert: {}", e),
            }
        }

        info!(
            "reset active preset: {} reverted, {} preserved",
            report.reverted.len(),
            report.preserved.len()
        );
        self.events.publish(&PresetApplied::cleared());
        report
    }
}
