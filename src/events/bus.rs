//! # Broadcast bus for lifecycle events.
//!
//! ```text
//! Publishers (many):                  Consumers:
//!   Worker       ──┐
//!   WorkerPool   ──┼──► Bus ──► SubscriberSet listener ──► Subscribe::on_event
//!   Orchestrator ──┘   (broadcast)  raw receivers (tests, embedders)
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receivers the event is dropped.
//! - The ring buffer is shared by all receivers; a receiver lagging more than
//!   `capacity` events observes `RecvError::Lagged(n)` and skips `n` events.
//! - Cloning is cheap; every component holds its own clone (injected at construction).

use tokio::sync::broadcast;

use super::event::{Event, Operation, Status};

/// Broadcast channel for lifecycle events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Shorthand for publishing a plain lifecycle transition.
    pub fn lifecycle(&self, component: &str, component_type: &str, op: Operation, status: Status) {
        self.publish(Event::new(component, component_type, op, status));
    }

    /// Creates a receiver observing events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        bus.lifecycle("x", "worker", Operation::Run, Status::Start);
        assert_eq!(bus.receiver_count(), 0);
    }

    #[test]
    fn receivers_see_events_after_subscribing() {
        let bus = Bus::new(8);
        bus.lifecycle("early", "worker", Operation::Init, Status::Start);

        let mut rx = bus.subscribe();
        bus.lifecycle("late", "worker", Operation::Init, Status::Success);

        let ev = rx.try_recv().unwrap();
        assert_eq!(&*ev.component, "late");
        assert_eq!(ev.status, Status::Success);
        assert!(rx.try_recv().is_err());
    }
}
