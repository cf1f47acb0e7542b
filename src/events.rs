//! Page events and the observer list that delivers them.
//!
//! Delivery is synchronous: `publish` calls every subscribed observer, in the
//! order they subscribed, before it returns. Observers only see the event, so
//! they cannot publish from inside a callback.

use crate::model::CanvasTool;

/// Events published by the item page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// Canvas contents or selection changed; redraw.
    RenderCanvas,
    /// The action list changed.
    ActionsChanged,
    /// The active canvas tool changed.
    ToolChanged(CanvasTool),
}

impl PageEvent {
    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            PageEvent::RenderCanvas => "render-canvas",
            PageEvent::ActionsChanged => "actions-changed",
            PageEvent::ToolChanged(_) => "tool-changed",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&PageEvent)>;

/// Ordered list of event observers.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. It receives every event published from now on.
    pub fn subscribe(&mut self, observer: impl FnMut(&PageEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Deliver `event` to all observers and return how many were notified.
    pub fn publish(&mut self, event: PageEvent) -> usize {
        log::trace!("Publishing {} to {} observers", event.name(), self.observers.len());
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
        self.observers.len()
    }

    /// Number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
