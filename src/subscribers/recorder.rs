use async_trait::async_trait;

use crate::collections::SafeQueue;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Subscriber keeping the most recent events in memory.
///
/// When full, the oldest event is evicted to make room.
#[derive(Debug)]
pub struct EventLog {
    events: SafeQueue<Event>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: SafeQueue::with_capacity(capacity),
        }
    }

    pub fn record(&self, event: Event) {
        let mut pending = event;
        while let Err(rejected) = self.events.push(pending) {
            let _ = self.events.pull();
            pending = rejected;
        }
    }

    /// Removes and returns every recorded event, oldest first.
    pub fn drain(&self) -> Vec<Event> {
        std::iter::from_fn(|| self.events.pull()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl Subscribe for EventLog {
    async fn on_event(&self, event: &Event) {
        self.record(event.clone());
    }

    fn name(&self) -> &'static str {
        "event-log"
    }

    fn queue_capacity(&self) -> usize {
        self.events.capacity()
    }
}
