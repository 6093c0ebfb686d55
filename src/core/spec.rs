//! # Pool specification.
//!
//! [`PoolSpec`] bundles what a [`WorkerPool`](crate::WorkerPool) is built from:
//! its name, the number of slots, the receptor factory and the per-slot run
//! strategy.
//!
//! A spec can be created:
//! - **Explicitly** with [`PoolSpec::new`]
//! - **From config** with [`PoolSpec::with_defaults`] (config replicas, run-loop)
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use slotvisor::{Config, Error, FactoryFn, PoolSpec, RunOnce, Runtime};
//!
//! struct Noop(String);
//!
//! #[async_trait]
//! impl Runtime for Noop {
//!     fn name(&self) -> &str { &self.0 }
//!     fn kind(&self) -> &str { "noop" }
//!     async fn run(&self) -> Result<(), Error> { Ok(()) }
//! }
//!
//! let factory = FactoryFn::arc(|name: String, _ctx: CancellationToken| async move {
//!     Ok::<_, Error>(Noop(name))
//! });
//!
//! let cfg = Config { replicas: 4, ..Config::default() };
//! let spec = PoolSpec::with_defaults("ingest", factory, &cfg)
//!     .with_slot_strategy(Arc::new(RunOnce));
//! assert_eq!(spec.replicas(), 4);
//! ```

use std::sync::Arc;

use super::slot::{RunLoop, SlotStrategy};
use crate::config::Config;
use crate::runtime::RuntimeFactory;

/// Specification of one worker pool.
#[derive(Clone)]
pub struct PoolSpec {
    name: String,
    replicas: usize,
    factory: Arc<dyn RuntimeFactory>,
    slot_strategy: Arc<dyn SlotStrategy>,
}

impl PoolSpec {
    pub fn new(
        name: impl Into<String>,
        replicas: usize,
        factory: Arc<dyn RuntimeFactory>,
        slot_strategy: Arc<dyn SlotStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            replicas,
            factory,
            slot_strategy,
        }
    }

    /// Spec with `cfg.replicas` slots running [`RunLoop`].
    pub fn with_defaults(
        name: impl Into<String>,
        factory: Arc<dyn RuntimeFactory>,
        cfg: &Config,
    ) -> Self {
        Self::new(name, cfg.replicas, factory, Arc::new(RunLoop))
    }

    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    pub fn with_slot_strategy(mut self, slot_strategy: Arc<dyn SlotStrategy>) -> Self {
        self.slot_strategy = slot_strategy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn factory(&self) -> &Arc<dyn RuntimeFactory> {
        &self.factory
    }

    pub fn slot_strategy(&self) -> &Arc<dyn SlotStrategy> {
        &self.slot_strategy
    }
}
