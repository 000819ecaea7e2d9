//! Notifications flowing from a speech engine back to the form

use log::debug;
use std::sync::mpsc::Sender;

/// Handle returned by [`SpeechPlatform::subscribe`](super::SpeechPlatform::subscribe)
pub type SubscriptionId = u64;

/// Handle for one submitted utterance, assigned by the engine on `speak`
pub type UtteranceId = u64;

/// Asynchronous signals emitted by a speech engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The set of installed voices changed; re-query the catalog
    VoicesChanged,
    /// An utterance finished on its own
    UtteranceEnded(UtteranceId),
}

/// Registered event sinks for one engine
///
/// Sinks whose receiving end has gone away are dropped on the next notify.
#[derive(Debug, Default)]
pub struct Subscribers {
    next_id: SubscriptionId,
    sinks: Vec<(SubscriptionId, Sender<PlatformEvent>)>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink and return its id
    pub fn add(&mut self, sink: Sender<PlatformEvent>) -> SubscriptionId {
        self.next_id += 1;
        let id = self.next_id;
        self.sinks.push((id, sink));
        debug!("Subscriber {} added ({} total)", id, self.sinks.len());
        id
    }

    /// Remove a sink; returns false if the id was unknown
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sid, _)| *sid != id);
        let removed = self.sinks.len() != before;
        if removed {
            debug!("Subscriber {} removed", id);
        }
        removed
    }

    /// Deliver an event to every live sink
    pub fn notify(&mut self, event: PlatformEvent) {
        debug!("Notifying {} subscribers: {:?}", self.sinks.len(), event);
        self.sinks.retain(|(_, sink)| sink.send(event).is_ok());
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}
