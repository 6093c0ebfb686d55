//! # Per-slot run strategies.
//!
//! [`WorkerPool::run`](crate::WorkerPool) calls its [`SlotStrategy`] once per
//! slot, all slots concurrently, and joins them.
//!
//! ```text
//! RunOnce:  run ─► handle_error (on failure) ─► done
//!
//! RunLoop:  ┌─► cancelled? ──yes──► exit
//!           │      │ no
//!           │   slot not ready / marked? ──► respawn (evict ─► spawn ─► init)
//!           │      │                 errors are reported; still not ready:
//!           │      │                 back off, retry
//!           │   run once
//!           │      ├─ ok: reset backoff
//!           │      └─ unhandled error: mark for respawn, back off
//!           └──────┘
//! ```
//!
//! Cancellation is observed between iterations only: a `run` already in
//! flight completes first. Backoff sleeps end early on cancellation.

use async_trait::async_trait;

use super::pool::WorkerPool;
use crate::error::Error;

/// How one slot of a pool is driven during `run`.
///
/// Custom strategies compose the pool's protocol steps:
/// [`WorkerPool::respawn`], [`WorkerPool::run_slot_once`] and
/// [`WorkerPool::back_off`].
#[async_trait]
pub trait SlotStrategy: Send + Sync + 'static {
    async fn run_slot(&self, pool: &WorkerPool, index: usize) -> Result<(), Error>;
}

/// Runs the slot's worker exactly once.
///
/// An empty slot is an invariant violation (`RuntimeError`).
#[derive(Debug, Default, Clone, Copy)]
pub struct RunOnce;

#[async_trait]
impl SlotStrategy for RunOnce {
    async fn run_slot(&self, pool: &WorkerPool, index: usize) -> Result<(), Error> {
        pool.run_slot_once(index).await
    }
}

/// Runs the slot repeatedly, respawning its worker after unhandled failures,
/// until the pool's token is cancelled.
///
/// A slot is (re)spawned whenever it is not ready: empty, never initialized,
/// failed to init, or stopped by an earlier `stop`. A respawn that replaced
/// the worker but failed to stop the old one is reported, and the new worker
/// runs.
///
/// Every failure is published on the bus as it happens. On exit the loop
/// reports the failure still unresolved at that time, if any.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunLoop;

#[async_trait]
impl SlotStrategy for RunLoop {
    async fn run_slot(&self, pool: &WorkerPool, index: usize) -> Result<(), Error> {
        let token = pool.token();
        let mut failures: u32 = 0;
        let mut needs_respawn = false;
        let mut unresolved: Option<Error> = None;

        loop {
            if token.is_cancelled() {
                break;
            }

            if needs_respawn || !pool.is_ready(index) {
                if let Err(e) = pool.respawn(index).await {
                    pool.report_failure(index, &e);
                    unresolved = Some(e);
                }
                needs_respawn = false;
                if !pool.is_ready(index) {
                    if !pool.back_off(failures).await {
                        break;
                    }
                    failures = failures.saturating_add(1);
                    continue;
                }
            }

            match pool.run_slot_once(index).await {
                Ok(()) => {
                    failures = 0;
                    unresolved = None;
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    pool.report_failure(index, &e);
                    unresolved = Some(e);
                    needs_respawn = true;
                    if !pool.back_off(failures).await {
                        break;
                    }
                    failures = failures.saturating_add(1);
                }
            }
        }

        unresolved.map_or(Ok(()), Err)
    }
}
