//! # Worker: one receptor bound to one strategy.
//!
//! Each lifecycle call goes through the pool's shared [`Strategy`] to the
//! receptor, bracketed by `start` and `success`/`failed` events on the bus.
//!
//! The worker only remembers where its receptor is in the lifecycle:
//! ```text
//! Spawned ─init ok─► Ready ─stop─► Stopped
//!    └─init err─► InitFailed ─stop─┘
//! ```
//! A stop attempt always ends in `Stopped`, even when the receptor reports an
//! error: the receptor is no longer considered live.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::fanout::observed;
use crate::error::Error;
use crate::events::{Bus, Operation};
use crate::runtime::{Runtime, Strategy};

const WORKER: &str = "worker";

/// Lifecycle position of a worker's receptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Built, not initialized yet.
    Spawned,
    /// Last `init` succeeded; the worker may run.
    Ready,
    /// Last `init` failed.
    InitFailed,
    /// `stop` was called.
    Stopped,
}

/// Pairing of one receptor with a strategy.
pub struct Worker {
    name: String,
    strategy: Arc<dyn Strategy>,
    receptor: Box<dyn Runtime>,
    bus: Bus,
    state: Mutex<WorkerState>,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        strategy: Arc<dyn Strategy>,
        receptor: Box<dyn Runtime>,
        bus: Bus,
    ) -> Self {
        Self {
            name: name.into(),
            strategy,
            receptor,
            bus,
            state: Mutex::new(WorkerState::Spawned),
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    /// `true` once `init` succeeded and until `stop` is called.
    pub fn is_ready(&self) -> bool {
        self.state() == WorkerState::Ready
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == WorkerState::Stopped
    }

    /// The runtime this worker drives.
    pub fn receptor(&self) -> &dyn Runtime {
        self.receptor.as_ref()
    }
}

#[async_trait]
impl Runtime for Worker {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        WORKER
    }

    fn bus(&self) -> Option<&Bus> {
        Some(&self.bus)
    }

    async fn init(&self) -> Result<(), Error> {
        let fut = self.strategy.init(self.receptor());
        let res = observed(&self.bus, &self.name, WORKER, Operation::Init, fut).await;
        *self.state.lock() = if res.is_ok() {
            WorkerState::Ready
        } else {
            WorkerState::InitFailed
        };
        res
    }

    async fn run(&self) -> Result<(), Error> {
        let fut = self.strategy.run(self.receptor());
        observed(&self.bus, &self.name, WORKER, Operation::Run, fut).await
    }

    async fn stop(&self) -> Result<(), Error> {
        let fut = self.strategy.stop(self.receptor());
        let res = observed(&self.bus, &self.name, WORKER, Operation::Stop, fut).await;
        *self.state.lock() = WorkerState::Stopped;
        res
    }

    async fn handle_error(&self, err: Error) -> Result<(), Error> {
        let fut = self.strategy.handle_error(self.receptor(), err);
        observed(&self.bus, &self.name, WORKER, Operation::HandleError, fut).await
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("receptor", &self.receptor.name())
            .field("state", &self.state())
            .finish()
    }
}
