use std::sync::Arc;

use super::orchestrator::Orchestrator;
use super::spec::PoolSpec;
use crate::config::Config;
use crate::events::Bus;
use crate::runtime::{DefaultStrategy, Strategy};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for an [`Orchestrator`] and its pools.
///
/// ## Example
/// ```rust
/// use slotvisor::{Config, Orchestrator};
///
/// let orch = Orchestrator::builder("edge", Config::default()).build();
/// assert_eq!(orch.pools(), 0);
/// ```
pub struct OrchestratorBuilder {
    name: String,
    cfg: Config,
    strategy: Arc<dyn Strategy>,
    worker_strategy: Arc<dyn Strategy>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    pools: Vec<PoolSpec>,
}

impl OrchestratorBuilder {
    pub fn new(name: impl Into<String>, cfg: Config) -> Self {
        Self {
            name: name.into(),
            cfg,
            strategy: Arc::new(DefaultStrategy),
            worker_strategy: Arc::new(DefaultStrategy),
            subscribers: Vec::new(),
            pools: Vec::new(),
        }
    }

    /// Strategy the orchestrator applies to its pools.
    pub fn with_strategy(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Strategy every worker applies to its receptor.
    pub fn with_worker_strategy(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.worker_strategy = strategy;
        self
    }

    /// Sets event subscribers.
    ///
    /// Each subscriber gets its own worker and bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    pub fn with_pool(mut self, spec: PoolSpec) -> Self {
        self.pools.push(spec);
        self
    }

    /// Builds the orchestrator: event bus, subscriber workers, root token and
    /// one pool per spec (in insertion order).
    ///
    /// Must be called within a tokio runtime when subscribers are set.
    pub fn build(self) -> Orchestrator {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let listener = if self.subscribers.is_empty() {
            None
        } else {
            Some(SubscriberSet::new(self.subscribers).listen(&bus))
        };

        let orch = Orchestrator::new_internal(
            self.name,
            self.cfg,
            self.strategy,
            self.worker_strategy,
            bus,
            listener,
        );
        for spec in self.pools {
            orch.add_pool(spec);
        }
        orch
    }
}
