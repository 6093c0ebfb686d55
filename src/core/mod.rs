//! Supervision core: workers, pools and the orchestrator.
//!
//! - [`worker`]: one receptor bound to one strategy;
//! - [`factory`]: builds workers (and their receptors) by name;
//! - [`pool`]: fixed slot array with spawn/respawn/run/stop fan-outs;
//! - [`slot`]: per-slot run strategies (run-once, run-loop);
//! - [`orchestrator`]: fan-out over pools, graceful serve/shutdown;
//! - [`shutdown`]: OS signal handling.

mod builder;
mod factory;
mod fanout;
mod orchestrator;
mod pool;
mod shutdown;
mod slot;
mod spec;
#[cfg(test)]
mod testing;
mod worker;

pub use builder::OrchestratorBuilder;
pub use factory::WorkerFactory;
pub use orchestrator::Orchestrator;
pub use pool::WorkerPool;
pub use slot::{RunLoop, RunOnce, SlotStrategy};
pub use spec::PoolSpec;
pub use worker::{Worker, WorkerState};
