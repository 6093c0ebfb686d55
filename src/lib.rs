//! # slotvisor
//!
//! **Slotvisor** is a process-supervision library for Rust.
//!
//! It manages the lifecycle (init, run, stop, recover) of many independently
//! failing units of work, organized as orchestrator → worker pool → worker,
//! plus the concurrency-safe primitives that hierarchy is built on
//! (containers and an in-memory lease).
//!
//! ## Architecture
//! ### Overview
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Orchestrator (Strategy applied to every pool)                   │
//! │  - Bus (broadcast events) ──► SubscriberSet (per-sub queues)     │
//! │  - root CancellationToken                                        │
//! └──────┬────────────────────────────┬──────────────────────────────┘
//!        ▼ (parallel, joined)         ▼
//! ┌──────────────────────┐    ┌──────────────────────┐
//! │ WorkerPool "ingest"  │    │ WorkerPool "export"  │   child token each
//! │ slots: [w0][w1][ ]   │    │ slots: [w0]          │
//! │ WorkerFactory        │    │ WorkerFactory        │
//! │ SlotStrategy         │    │ SlotStrategy         │
//! └──┬─────┬─────┬───────┘    └──┬───────────────────┘
//!    ▼     ▼     ▼ (parallel, joined)
//!  Worker = Strategy + receptor (your Runtime)
//! ```
//!
//! ### Slot lifecycle
//! ```text
//! empty ─► spawning ─► initialized ─► running ─┬─► stopped
//!   ▲                                          │
//!   └──── respawning (stop, spawn, init) ◄── error
//! ```
//!
//! Errors flow back up the same path. Each layer isolates its children's
//! failures and composes them into one [`ErrorKind::ErrorList`] tree.
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                              |
//! |-------------------|-----------------------------------------------------------|-------------------------------------------------|
//! | **Runtime**       | Lifecycle contract implemented by your receptors.         | [`Runtime`], [`RuntimeFactory`], [`FactoryFn`]  |
//! | **Strategies**    | How lifecycle calls reach a runtime.                      | [`Strategy`], [`DefaultStrategy`], [`RetryStrategy`] |
//! | **Supervision**   | Pools of worker slots and their orchestrator.             | [`Orchestrator`], [`WorkerPool`], [`PoolSpec`]  |
//! | **Slot strategies**| Run once, or loop with respawn until cancelled.          | [`SlotStrategy`], [`RunOnce`], [`RunLoop`]      |
//! | **Errors**        | Recursive error tree with aggregation.                    | [`Error`], [`ErrorKind`], [`aggregate`]         |
//! | **Events**        | Lifecycle events and subscribers.                         | [`Bus`], [`Event`], [`Subscribe`], [`EventLog`] |
//! | **Containers**    | Mutex-guarded map, set, array, queue.                     | [`SafeMap`], [`SafeSet`], [`SafeArray`], [`SafeQueue`] |
//! | **Leases**        | In-memory time locks with compare-and-swap renewal.       | [`Leaser`], [`LeaserBuilder`]                   |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], forwarding events to `tracing`.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use slotvisor::{Config, Error, FactoryFn, Orchestrator, PoolSpec, Runtime, Subscribe};
//!
//! struct Poller {
//!     name: String,
//! }
//!
//! #[async_trait]
//! impl Runtime for Poller {
//!     fn name(&self) -> &str { &self.name }
//!     fn kind(&self) -> &str { "poller" }
//!
//!     async fn run(&self) -> Result<(), Error> {
//!         tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let cfg = Config { replicas: 3, ..Config::default() };
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(slotvisor::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     let pollers = FactoryFn::arc(|name: String, _ctx: CancellationToken| async move {
//!         Ok::<_, Error>(Poller { name })
//!     });
//!
//!     let orch = Orchestrator::builder("edge", cfg.clone())
//!         .with_subscribers(subs)
//!         .with_pool(PoolSpec::with_defaults("pollers", pollers, &cfg))
//!         .build();
//!
//!     // Runs until SIGINT/SIGTERM, then stops every pool.
//!     orch.serve().await
//! }
//! ```
mod collections;
mod config;
mod core;
mod error;
mod events;
mod lease;
mod policies;
mod runtime;
mod subscribers;

// ---- Public re-exports ----

pub use collections::{SafeArray, SafeMap, SafeQueue, SafeSet};
pub use config::Config;
pub use crate::core::{
    Orchestrator, OrchestratorBuilder, PoolSpec, RunLoop, RunOnce, SlotStrategy, Worker,
    WorkerFactory, WorkerPool, WorkerState,
};
pub use error::{Error, ErrorKind, Severity, aggregate};
pub use events::{Bus, Event, Operation, Status};
pub use lease::{InMemoryLeaser, LeaseError, Leaser, LeaserBuilder};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use runtime::{DefaultStrategy, FactoryFn, RetryStrategy, Runtime, RuntimeFactory, Strategy};
pub use subscribers::{EventLog, Listener, Subscribe, SubscriberSet};

// Optional: built-in `tracing` subscriber.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
