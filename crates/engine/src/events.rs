//! Event types for preset change notifications.
//!
//! The controller publishes a [`PresetApplied`] event after every apply and
//! every effective reset so other views can mirror the active preset. Delivery
//! is synchronous, in subscription order, on the publishing thread.

use std::cell::RefCell;
use std::rc::Rc;

use crate::model::Delta;

/// Wire name of the event, for transports that key events by string.
pub const PRESET_APPLIED: &str = "presetApplied";

/// Emitted on apply (with the preset's delta) and on reset (with `None`).
#[derive(Debug, Clone, PartialEq)]
pub struct PresetApplied {
    /// `Some` after apply, even when the delta is empty. `None` means no active preset.
    pub delta: Option<Delta>,
}

impl PresetApplied {
    pub fn applied(delta: Delta) -> Self {
        Self { delta: Some(delta) }
    }

    pub fn cleared() -> Self {
        Self { delta: None }
    }

    pub fn name(&self) -> &'static str {
        PRESET_APPLIED
    }

    pub fn is_cleared(&self) -> bool {
        self.delta.is_none()
    }
}

/// Callback type for receiving preset events.
pub type EventCallback = Box<dyn FnMut(&PresetApplied)>;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Publish/subscribe hub owned by a controller.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, EventCallback)>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&PresetApplied) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: &PresetApplied) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Simple event collector for testing.
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Rc<RefCell<Vec<PresetApplied>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records into this collector.
    pub fn callback(&self) -> impl FnMut(&PresetApplied) + 'static {
        let events = Rc::clone(&self.events);
        move |event: &PresetApplied| events.borrow_mut().push(event.clone())
    }

    pub fn events(&self) -> Vec<PresetApplied> {
        self.events.borrow().clone()
    }

    pub fn last(&self) -> Option<PresetApplied> {
        self.events.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}
