use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::Event;

const CHANNEL_CAPACITY: usize = 256;

/// Scope key for fan-out: `None` is the shared global calendar, `Some` an
/// apartment id.
pub type ScopeKey = Option<String>;

/// Broadcast hub for booking lifecycle events, one channel per scope.
/// Lets calendar views and payment follow-ups observe changes without
/// polling the stores.
pub struct NotifyHub {
    channels: DashMap<ScopeKey, broadcast::Sender<Event>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to events for a scope. Creates the channel if needed.
    pub fn subscribe(&self, scope: ScopeKey) -> broadcast::Receiver<Event> {
        let sender = self
            .channels
            .entry(scope)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send an event. No-op if nobody is listening on that scope.
    pub fn send(&self, scope: &ScopeKey, event: &Event) {
        if let Some(sender) = self.channels.get(scope) {
            let _ = sender.send(event.clone());
        }
    }
}
