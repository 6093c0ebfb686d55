//! # Units of work and the policies that drive them.
//!
//! - [`Runtime`]: the lifecycle contract (`init`, `run`, `stop`, `handle_error`)
//!   implemented by receptors, and by [`Worker`](crate::Worker),
//!   [`WorkerPool`](crate::WorkerPool) and [`Orchestrator`](crate::Orchestrator) themselves.
//! - [`RuntimeFactory`] / [`FactoryFn`]: build fresh receptors by name.
//! - [`Strategy`]: mediates how each lifecycle call reaches a runtime
//!   ([`DefaultStrategy`] forwards, [`RetryStrategy`] retries `run`).

mod factory;
mod runtime;
mod strategy;

pub use factory::{FactoryFn, RuntimeFactory};
pub use runtime::Runtime;
pub use strategy::{DefaultStrategy, RetryStrategy, Strategy};
