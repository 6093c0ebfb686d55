//! # WorkerPool: a fixed set of worker slots.
//!
//! A pool owns `replicas` slots addressed by index. Each slot is empty or
//! holds exactly one live [`Worker`]. Lifecycle calls fan out over the slots
//! concurrently and join before returning:
//!
//! ```text
//! init ─► [evict + spawn slot 0..N] ─join─► [init occupied slots] ─join─► aggregate
//! run  ─► [SlotStrategy::run_slot(0..N)] ─join─► aggregate
//! stop ─► [stop occupied slots] ─join─► aggregate (slots are kept)
//! ```
//!
//! ## Rules
//! - One slot failing never aborts its siblings; all errors are composed into
//!   one `ErrorList` in completion order.
//! - Replacing an occupant always stops it first (see [`WorkerPool::respawn`]),
//!   unless it is already stopped.
//! - A stopped worker stays in its slot but is never ready; run-loops replace
//!   it before running the slot again.
//! - Only the unit driving slot `i` writes slot `i` during a fan-out round.
//! - Failing to store a freshly spawned worker into its slot aborts the process.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::factory::WorkerFactory;
use super::fanout::{join_errors, observed};
use super::slot::SlotStrategy;
use super::spec::PoolSpec;
use super::worker::Worker;
use crate::collections::SafeArray;
use crate::error::{Error, aggregate};
use crate::events::{Bus, Event, Operation, Status};
use crate::policies::BackoffPolicy;
use crate::runtime::{Runtime, Strategy};

const WORKER_POOL: &str = "worker-pool";

/// Fixed-capacity collection of worker slots.
///
/// Cloning is cheap and yields a handle to the same pool.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    replicas: usize,
    slots: SafeArray<Option<Arc<Worker>>>,
    factory: WorkerFactory,
    slot_strategy: Arc<dyn SlotStrategy>,
    backoff: BackoffPolicy,
    token: CancellationToken,
    bus: Bus,
}

impl WorkerPool {
    /// Creates a pool with `spec.replicas()` empty slots.
    ///
    /// `strategy` is shared by every worker; `backoff` paces failed run-loop
    /// iterations; `token` ends run-loops.
    pub fn new(
        spec: PoolSpec,
        strategy: Arc<dyn Strategy>,
        backoff: BackoffPolicy,
        bus: Bus,
        token: CancellationToken,
    ) -> Self {
        let factory = WorkerFactory::new(Arc::clone(spec.factory()), strategy, bus.clone());
        Self {
            inner: Arc::new(Inner {
                name: spec.name().to_string(),
                replicas: spec.replicas(),
                slots: SafeArray::with_size(spec.replicas()),
                factory,
                slot_strategy: Arc::clone(spec.slot_strategy()),
                backoff,
                token,
                bus,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn replicas(&self) -> usize {
        self.inner.replicas
    }

    /// Worker currently in slot `index`.
    pub fn worker(&self, index: usize) -> Option<Arc<Worker>> {
        self.inner.slots.get(index).flatten()
    }

    /// `true` if slot `index` holds an initialized, unstopped worker.
    pub fn is_ready(&self, index: usize) -> bool {
        self.worker(index).is_some_and(|w| w.is_ready())
    }

    /// Number of non-empty slots.
    pub fn occupied(&self) -> usize {
        self.occupied_slots().len()
    }

    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Cancels the pool's token; run-loops exit after their current iteration.
    pub fn cancel(&self) {
        self.inner.token.cancel();
    }

    /// Replaces the worker in slot `index`.
    ///
    /// Stops and removes the occupant (if any), spawns a fresh worker into the
    /// slot, then initializes it. Every step runs even if an earlier one
    /// failed; the errors of all steps are returned together. A worker whose
    /// `init` failed stays in the slot.
    ///
    /// An error does not mean the slot is unusable: the occupant may have
    /// failed to stop while its replacement came up fine. Check
    /// [`WorkerPool::is_ready`] for that.
    pub async fn respawn(&self, index: usize) -> Result<(), Error> {
        self.check_slot(index)?;
        self.progress(index, Operation::Init, format!("respawning {}", self.worker_name(index)));

        let mut errors = Vec::new();
        if let Err(e) = self.evict(index).await {
            errors.push(e);
        }
        match self.spawn_slot(index).await {
            Ok(()) => {
                if let Some(worker) = self.worker(index) {
                    if let Err(e) = worker.init().await {
                        errors.push(e);
                    }
                }
            }
            Err(e) => errors.push(e),
        }
        aggregate(format!("{WORKER_POOL} {}: respawn slot {index}", self.name()), errors)
    }

    /// Runs the worker of slot `index` once.
    ///
    /// A failed run goes through the worker's `handle_error`; the returned
    /// error is whatever that leaves unhandled.
    pub async fn run_slot_once(&self, index: usize) -> Result<(), Error> {
        self.check_slot(index)?;
        let Some(worker) = self.worker(index) else {
            return Err(Error::runtime(format!(
                "worker should be initialized; got: nil (slot {index})"
            )));
        };
        match worker.run().await {
            Ok(()) => Ok(()),
            Err(e) => worker.handle_error(e).await,
        }
    }

    /// Sleeps before retry `attempt` of a failing slot.
    ///
    /// Returns `false` (early) if the pool's token is cancelled.
    pub async fn back_off(&self, attempt: u32) -> bool {
        let delay = self.inner.backoff.next(attempt);
        tokio::select! {
            biased;
            _ = self.inner.token.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    pub(crate) fn report_failure(&self, index: usize, err: &Error) {
        self.inner.bus.publish(
            Event::new(self.name(), WORKER_POOL, Operation::Run, Status::Failed)
                .with_slot(index)
                .with_reason(err.headline()),
        );
    }

    fn check_slot(&self, index: usize) -> Result<(), Error> {
        if index < self.replicas() {
            Ok(())
        } else {
            Err(Error::runtime(format!(
                "slot {index} out of range for {} replicas",
                self.replicas()
            )))
        }
    }

    fn worker_name(&self, index: usize) -> String {
        format!("{}-{index}", self.name())
    }

    fn occupied_slots(&self) -> Vec<(usize, Arc<Worker>)> {
        self.inner
            .slots
            .to_vec()
            .into_iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|w| (i, w)))
            .collect()
    }

    fn progress(&self, index: usize, op: Operation, reason: String) {
        self.inner.bus.publish(
            Event::new(self.name(), WORKER_POOL, op, Status::Progress)
                .with_slot(index)
                .with_reason(reason),
        );
    }

    /// Stops and removes the occupant of slot `index`, if any.
    ///
    /// An occupant that was already stopped is only removed.
    async fn evict(&self, index: usize) -> Result<(), Error> {
        let Some(worker) = self.worker(index) else {
            return Ok(());
        };
        tracing::info!(pool = %self.name(), slot = index, worker = %worker.name(), "evicting worker");
        self.progress(index, Operation::Stop, format!("evicting {}", worker.name()));

        let res = if worker.is_stopped() {
            Ok(())
        } else {
            worker.stop().await
        };
        self.store(index, None);
        res
    }

    async fn spawn_slot(&self, index: usize) -> Result<(), Error> {
        let name = self.worker_name(index);
        self.progress(index, Operation::Init, format!("spawning {name}"));
        let worker = self.inner.factory.spawn(&name, self.token()).await?;
        self.store(index, Some(Arc::new(worker)));
        tracing::debug!(pool = %self.name(), slot = index, worker = %name, "worker spawned");
        self.progress(index, Operation::Init, format!("spawned {name}"));
        Ok(())
    }

    /// Writes slot `index`.
    ///
    /// Callers only pass checked indices, so a rejected write means the slot
    /// array is corrupted. The process aborts rather than keep running with
    /// a worker nobody owns.
    fn store(&self, index: usize, worker: Option<Arc<Worker>>) {
        if !self.inner.slots.set(index, worker) {
            tracing::error!(
                pool = %self.name(),
                slot = index,
                replicas = self.replicas(),
                "failed to store worker into its slot, aborting"
            );
            self.inner.bus.publish(
                Event::new(self.name(), WORKER_POOL, Operation::Init, Status::Failed)
                    .with_slot(index)
                    .with_reason("worker slot store failed"),
            );
            std::process::abort();
        }
    }

    fn conclude(&self, op: Operation, errors: Vec<Error>) -> Result<(), Error> {
        aggregate(format!("{WORKER_POOL} {}: {op}", self.name()), errors)
    }
}

#[async_trait]
impl Runtime for WorkerPool {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn kind(&self) -> &str {
        WORKER_POOL
    }

    fn bus(&self) -> Option<&Bus> {
        Some(&self.inner.bus)
    }

    /// Spawns every slot, then initializes every spawned worker.
    async fn init(&self) -> Result<(), Error> {
        let fut = async {
            let mut spawns = JoinSet::new();
            for index in 0..self.replicas() {
                let pool = self.clone();
                spawns.spawn(async move {
                    let evicted = pool.evict(index).await.err();
                    let spawned = pool.spawn_slot(index).await.err();
                    evicted.into_iter().chain(spawned).collect::<Vec<_>>()
                });
            }
            let mut errors = join_errors(spawns, "spawn").await;

            let mut inits = JoinSet::new();
            for (_, worker) in self.occupied_slots() {
                inits.spawn(async move { worker.init().await.err() });
            }
            errors.extend(join_errors(inits, "init").await);

            self.conclude(Operation::Init, errors)
        };
        observed(&self.inner.bus, self.name(), WORKER_POOL, Operation::Init, fut).await
    }

    /// Drives every slot (empty ones included) with the slot strategy.
    async fn run(&self) -> Result<(), Error> {
        let fut = async {
            let mut slots = JoinSet::new();
            for index in 0..self.replicas() {
                let pool = self.clone();
                slots.spawn(async move {
                    let strategy = Arc::clone(&pool.inner.slot_strategy);
                    strategy.run_slot(&pool, index).await.err()
                });
            }
            let errors = join_errors(slots, "slot").await;
            self.conclude(Operation::Run, errors)
        };
        observed(&self.inner.bus, self.name(), WORKER_POOL, Operation::Run, fut).await
    }

    /// Stops every occupied slot. Slots keep their workers.
    async fn stop(&self) -> Result<(), Error> {
        let fut = async {
            let mut stops = JoinSet::new();
            for (_, worker) in self.occupied_slots() {
                stops.spawn(async move { worker.stop().await.err() });
            }
            let errors = join_errors(stops, "stop").await;
            self.conclude(Operation::Stop, errors)
        };
        observed(&self.inner.bus, self.name(), WORKER_POOL, Operation::Stop, fut).await
    }

    /// Reserved hook; pools absorb nothing on their own.
    async fn handle_error(&self, _err: Error) -> Result<(), Error> {
        Ok(())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.inner.name)
            .field("replicas", &self.inner.replicas)
            .field("occupied", &self.occupied())
            .finish()
    }
}
