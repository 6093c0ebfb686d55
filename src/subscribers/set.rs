//! # SubscriberSet: non-blocking fan-out over multiple subscribers.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on queue overflow (the event is dropped for that subscriber).
//!
//! ## Bus listener
//! [`SubscriberSet::listen`] attaches the set to a [`Bus`]. Closing the
//! returned [`Listener`] forwards whatever the bus still holds for it, then
//! waits for every subscriber to drain its queue.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Subscribe;
use crate::events::{Bus, Event};

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

            workers.push(tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        tracing::error!(subscriber = name, ?panic, "subscriber panicked");
                    }
                }
            }));
            channels.push(SubscriberChannel { name, sender: tx });
        }

        Self { channels, workers }
    }

    /// Forwards every event published on `bus` into this set.
    ///
    /// The listener task ends once every bus sender is dropped or the
    /// returned [`Listener`] is closed.
    pub fn listen(self, bus: &Bus) -> Listener {
        let mut rx = bus.subscribe();
        let set = Arc::new(self);
        let stop = CancellationToken::new();

        let task = tokio::spawn({
            let set = Arc::clone(&set);
            let stop = stop.clone();
            async move {
                loop {
                    tokio::select! {
                        biased;
                        res = rx.recv() => match res {
                            Ok(ev) => set.emit(&ev),
                            Err(RecvError::Lagged(skipped)) => {
                                tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                            }
                            Err(RecvError::Closed) => break,
                        },
                        _ = stop.cancelled() => {
                            loop {
                                match rx.try_recv() {
                                    Ok(ev) => set.emit(&ev),
                                    Err(TryRecvError::Lagged(skipped)) => {
                                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                                    }
                                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                                }
                            }
                            break;
                        }
                    }
                }
            }
        });

        Listener { set, task, stop }
    }

    /// Fan-out one event to all subscribers (non-blocking).
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = channel.name, "dropped event: queue full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!(subscriber = channel.name, "dropped event: worker closed");
                }
            }
        }
    }

    /// Closes all queues and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

/// A [`SubscriberSet`] attached to a bus.
pub struct Listener {
    set: Arc<SubscriberSet>,
    task: JoinHandle<()>,
    stop: CancellationToken,
}

impl Listener {
    /// Forwards the events already queued on the bus, then shuts the set down.
    ///
    /// Returns once every subscriber has handled what it was given.
    pub async fn close(self) {
        self.stop.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "subscriber listener ended abnormally");
        }
        match Arc::try_unwrap(self.set) {
            Ok(set) => set.shutdown().await,
            Err(_) => tracing::warn!("subscriber set still shared, queues left open"),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("subscribers", &self.set.len())
            .field("closed", &self.stop.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Operation, Status};
    use crate::subscribers::EventLog;
    use async_trait::async_trait;

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, _event: &Event) {
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn panicking_subscriber_does_not_affect_others() {
        let log = Arc::new(EventLog::new(16));
        let set = SubscriberSet::new(vec![Arc::new(Panicky) as Arc<dyn Subscribe>, log.clone()]);
        assert_eq!(set.len(), 2);

        set.emit(&Event::new("w", "worker", Operation::Run, Status::Start));
        set.emit(&Event::new("w", "worker", Operation::Run, Status::Success));
        set.shutdown().await;

        let statuses: Vec<Status> = log.drain().into_iter().map(|e| e.status).collect();
        assert_eq!(statuses, [Status::Start, Status::Success]);
    }

    #[tokio::test]
    async fn listener_forwards_bus_events() {
        let bus = Bus::new(16);
        let log = Arc::new(EventLog::new(16));
        let set = SubscriberSet::new(vec![log.clone() as Arc<dyn Subscribe>]);
        let listener = set.listen(&bus);
        assert_eq!(listener.len(), 1);

        bus.lifecycle("pool", "worker-pool", Operation::Init, Status::Start);
        drop(bus);
        listener.close().await;

        assert_eq!(log.len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn closing_the_listener_delivers_queued_events() {
        let bus = Bus::new(64);
        let log = Arc::new(EventLog::new(64));
        let listener = SubscriberSet::new(vec![log.clone() as Arc<dyn Subscribe>]).listen(&bus);

        // Nothing has yielded to the listener task yet.
        for _ in 0..10 {
            bus.lifecycle("pool", "worker-pool", Operation::Run, Status::Start);
        }
        listener.close().await;

        assert_eq!(log.len(), 10);
        bus.lifecycle("pool", "worker-pool", Operation::Run, Status::Success);
        assert_eq!(log.len(), 10);
    }
}
